//! Resolved endpoint models.

use std::fmt;
use std::net::IpAddr;

/// A single resolved upstream address together with its in-flight load.
///
/// Identity across calls is the `(address, version)` pair. Two endpoints with
/// the same address but different versions refer to different generations
/// of the pool and never match each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    address: String,
    busy: i64,
    version: u64,
}

impl Endpoint {
    /// Create an idle endpoint stamped with the generation that produced it.
    pub fn new(address: impl Into<String>, version: u64) -> Self {
        Self {
            address: address.into(),
            busy: 0,
            version,
        }
    }

    /// Build an endpoint from a resolved IP and an optional fixed port.
    pub fn from_ip(ip: IpAddr, port: Option<&str>, version: u64) -> Self {
        Self::new(format_address(ip, port), version)
    }

    /// The dialable address, `ip` or `ip:port`.
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Number of operations currently attributed to this endpoint.
    ///
    /// Always zero on snapshot copies handed out by the pool.
    pub fn busy(&self) -> i64 {
        self.busy
    }

    /// Resolution generation that produced this endpoint.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether `other` carries the same `(address, version)` identity.
    pub fn matches(&self, other: &Endpoint) -> bool {
        self.version == other.version && self.address == other.address
    }

    /// Copy of this endpoint with the busy counter zeroed.
    pub fn detached(&self) -> Self {
        Self {
            address: self.address.clone(),
            busy: 0,
            version: self.version,
        }
    }

    pub(crate) fn add_busy(&mut self, delta: i64) {
        self.busy += delta;
    }

    pub(crate) fn clear_busy(&mut self) {
        self.busy = 0;
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address)
    }
}

/// Format a resolved IP as a dialable address.
///
/// Without a port this is the plain textual IP. With a port, IPv6 literals
/// are bracketed so the result parses as a socket address.
pub fn format_address(ip: IpAddr, port: Option<&str>) -> String {
    match (ip, port) {
        (_, None) => ip.to_string(),
        (IpAddr::V4(v4), Some(port)) => format!("{}:{}", v4, port),
        (IpAddr::V6(v6), Some(port)) => format!("[{}]:{}", v6, port),
    }
}
