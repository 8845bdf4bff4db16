//! The endpoint registry for one upstream.
//!
//! All state lives behind a single mutex which is only ever held for
//! in-memory bookkeeping. Resolution I/O happens outside the lock: a refresh
//! first takes a new generation number with [`PoolState::next_version`],
//! performs its lookup, and then hands the result to [`PoolState::commit`].
//!
//! The pool version and the version stamped on live entries are allowed to
//! drift apart: a refresh that finds the same address set advances the pool
//! version but keeps the existing entries (and their stamps and counters).

use std::sync::Arc;

use parking_lot::Mutex;
use rand::Rng;

use crate::domain::endpoint::Endpoint;
use crate::domain::fingerprint::Fingerprint;
use crate::error::PoolError;
use crate::load_balancer::guard::{OwnedUsageGuard, UsageGuard};
use crate::load_balancer::selector::order_least_busy;

/// Result of committing a resolution into the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The address set changed; entries were replaced and counters reset.
    Replaced,
    /// Same fingerprint as before; nothing was touched.
    Unchanged,
}

#[derive(Debug, Default)]
struct Inner {
    endpoints: Vec<Endpoint>,
    fingerprint: Fingerprint,
    version: u64,
}

/// Lock-protected registry of endpoints, fingerprint and generation counter.
#[derive(Debug, Default)]
pub struct PoolState {
    inner: Mutex<Inner>,
}

impl PoolState {
    /// Create an empty pool at version zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new resolution generation and return its number.
    ///
    /// Called before every lookup, whether or not the lookup succeeds.
    pub fn next_version(&self) -> u64 {
        let mut inner = self.inner.lock();
        inner.version += 1;
        inner.version
    }

    /// Install a resolution result if its fingerprint differs from the
    /// current one.
    pub fn commit(&self, fingerprint: &Fingerprint, endpoints: Vec<Endpoint>) -> CommitOutcome {
        let mut inner = self.inner.lock();
        if inner.fingerprint == *fingerprint {
            return CommitOutcome::Unchanged;
        }

        inner.fingerprint = fingerprint.clone();
        inner.endpoints = endpoints;
        CommitOutcome::Replaced
    }

    /// Least-busy ordered copies of every live endpoint.
    ///
    /// Returned entries keep their `(address, version)` identity but carry a
    /// zero busy count.
    pub fn snapshot(&self) -> Result<Vec<Endpoint>, PoolError> {
        self.snapshot_with(&mut rand::thread_rng())
    }

    /// Like [`snapshot`](Self::snapshot) with a caller-supplied tie-break RNG.
    pub fn snapshot_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Endpoint>, PoolError> {
        let mut entries = {
            let inner = self.inner.lock();
            if inner.endpoints.is_empty() {
                return Err(PoolError::Empty);
            }
            inner.endpoints.clone()
        };

        order_least_busy(&mut entries, rng);
        entries.iter_mut().for_each(Endpoint::clear_busy);
        Ok(entries)
    }

    /// Attribute one more in-flight operation to the live entry matching
    /// `endpoint`. Returns `false` when the identity is stale.
    pub fn acquire(&self, endpoint: &Endpoint) -> bool {
        self.adjust(endpoint, 1)
    }

    /// Remove one in-flight operation from the live entry matching
    /// `endpoint`. Returns `false` when the identity is stale.
    pub fn release(&self, endpoint: &Endpoint) -> bool {
        self.adjust(endpoint, -1)
    }

    /// [`acquire`](Self::acquire) now and [`release`](Self::release) when the
    /// returned guard is dropped.
    pub fn lease(&self, endpoint: &Endpoint) -> UsageGuard<'_> {
        UsageGuard::new(self, endpoint)
    }

    /// Like [`lease`](Self::lease), but the guard keeps its own handle on
    /// the pool so it can move into a spawned `'static` task.
    pub fn lease_owned(self: &Arc<Self>, endpoint: &Endpoint) -> OwnedUsageGuard {
        OwnedUsageGuard::new(Arc::clone(self), endpoint)
    }

    fn adjust(&self, endpoint: &Endpoint, delta: i64) -> bool {
        let mut inner = self.inner.lock();
        let mut matched = false;
        for live in inner.endpoints.iter_mut().filter(|e| e.matches(endpoint)) {
            live.add_busy(delta);
            matched = true;
        }
        matched
    }

    /// Authoritative busy count of the live entry matching `endpoint`.
    pub fn busy(&self, endpoint: &Endpoint) -> Option<i64> {
        let inner = self.inner.lock();
        inner
            .endpoints
            .iter()
            .find(|e| e.matches(endpoint))
            .map(Endpoint::busy)
    }

    /// Current generation number.
    pub fn version(&self) -> u64 {
        self.inner.lock().version
    }

    /// Fingerprint of the committed address set.
    pub fn fingerprint(&self) -> Fingerprint {
        self.inner.lock().fingerprint.clone()
    }

    /// Number of live endpoints.
    pub fn len(&self) -> usize {
        self.inner.lock().endpoints.len()
    }

    /// Whether no endpoints are known.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().endpoints.is_empty()
    }
}

/// A pool shared between its owning handle and the refresh task.
pub type SharedPool = Arc<PoolState>;
