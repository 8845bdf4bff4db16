//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use dnspool::Lookup;

/// A lookup whose answer can be changed between calls.
pub struct ScriptedLookup {
    answer: Mutex<Result<Vec<IpAddr>, String>>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            answer: Mutex::new(Ok(parse(texts))),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: &str) -> Self {
        let lookup = Self::new(&[]);
        lookup.fail(message);
        lookup
    }

    pub fn answer(&self, texts: &[&str]) {
        *self.answer.lock().unwrap() = Ok(parse(texts));
    }

    pub fn fail(&self, message: &str) {
        *self.answer.lock().unwrap() = Err(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lookup for ScriptedLookup {
    async fn lookup_ip(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer
            .lock()
            .unwrap()
            .clone()
            .map_err(|msg| io::Error::new(io::ErrorKind::Other, msg))
    }
}

fn parse(texts: &[&str]) -> Vec<IpAddr> {
    texts.iter().map(|t| t.parse().unwrap()).collect()
}

/// Answers the first call, then never completes again.
pub struct StallingLookup {
    first: Vec<IpAddr>,
    calls: AtomicUsize,
}

impl StallingLookup {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            first: parse(texts),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Lookup for StallingLookup {
    async fn lookup_ip(&self, _host: &str) -> io::Result<Vec<IpAddr>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            return Ok(self.first.clone());
        }
        std::future::pending().await
    }
}
