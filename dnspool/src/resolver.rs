//! Hostname resolution and commit into the pool.
//!
//! Every pass takes a new pool generation before the lookup starts, so the
//! version advances even when the lookup later fails or times out. The
//! lookup runs without holding the pool lock; only the fingerprint
//! comparison and list swap happen under it.

use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dnspool_core::{AddressSet, CommitOutcome, Endpoint, SharedPool};
use tokio::time;

use crate::config::UpstreamTarget;
use crate::error::ResolveError;

/// Interface that turns a hostname into the IP addresses it currently
/// resolves to.
#[async_trait]
pub trait Lookup: Send + Sync {
    /// Return every address for `host`, in whatever order the source
    /// produces them. Duplicates are passed through untouched.
    async fn lookup_ip(&self, host: &str) -> io::Result<Vec<IpAddr>>;
}

/// [`Lookup`] backed by the operating system resolver.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLookup;

#[async_trait]
impl Lookup for SystemLookup {
    async fn lookup_ip(&self, host: &str) -> io::Result<Vec<IpAddr>> {
        let addrs = tokio::net::lookup_host((host, 0)).await?;
        Ok(addrs.map(|addr| addr.ip()).collect())
    }
}

/// Resolves the configured upstream and commits results into its pool.
pub struct Resolver {
    target: UpstreamTarget,
    lookup: Arc<dyn Lookup>,
    timeout: Duration,
    pool: SharedPool,
}

impl Resolver {
    /// Create a resolver feeding `pool`.
    pub fn new(
        target: UpstreamTarget,
        lookup: Arc<dyn Lookup>,
        timeout: Duration,
        pool: SharedPool,
    ) -> Self {
        Self {
            target,
            lookup,
            timeout,
            pool,
        }
    }

    /// Run one resolution pass.
    ///
    /// Returns the endpoints built from this lookup. They are only installed
    /// in the pool when the address set changed; otherwise the live entries
    /// (and their busy counters) are kept.
    pub async fn refresh(&self) -> Result<Vec<Endpoint>, ResolveError> {
        let version = self.pool.next_version();
        let host = self.target.host();

        let addrs = match time::timeout(self.timeout, self.lookup.lookup_ip(host)).await {
            Ok(Ok(addrs)) => addrs,
            Ok(Err(source)) => {
                return Err(ResolveError::Lookup {
                    host: host.to_string(),
                    source,
                })
            }
            Err(_) => {
                return Err(ResolveError::Timeout {
                    host: host.to_string(),
                    after: self.timeout,
                })
            }
        };

        let set = AddressSet::new(addrs);
        let endpoints = set.to_endpoints(self.target.port(), version);

        match self.pool.commit(set.fingerprint(), endpoints.clone()) {
            CommitOutcome::Replaced => tracing::debug!(
                host,
                version,
                fingerprint = %set.fingerprint(),
                addresses = set.len(),
                "upstream address set replaced"
            ),
            CommitOutcome::Unchanged => {
                tracing::debug!(host, version, "upstream address set unchanged")
            }
        }

        Ok(endpoints)
    }

    /// The upstream being resolved.
    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    /// The pool this resolver writes into.
    pub fn pool(&self) -> &SharedPool {
        &self.pool
    }
}

impl fmt::Debug for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
