//! The upstream pool handle.

use std::sync::Arc;

use dnspool_core::{
    Endpoint, Fingerprint, OwnedUsageGuard, PoolError, PoolState, SharedPool, UsageGuard,
};
use tokio_util::sync::CancellationToken;

use crate::config::{PoolSettings, UpstreamTarget};
use crate::error::UpstreamError;
use crate::refresh::spawn_refresh_loop;
use crate::resolver::{Lookup, Resolver, SystemLookup};

/// A live, periodically re-resolved pool of endpoints for one upstream.
///
/// Callers take a least-busy snapshot with [`get_all`](Self::get_all), pick
/// an entry, and bracket their work with [`acquire`](Self::acquire) and
/// [`release`](Self::release) (or hold a [`lease`](Self::lease)).
///
/// Dropping the handle stops the background refresh.
#[derive(Debug)]
pub struct Upstream {
    resolver: Arc<Resolver>,
    pool: SharedPool,
    cancel: CancellationToken,
}

impl Upstream {
    /// Resolve `upstream` (`host` or `host:port`) with the system resolver
    /// and default settings, then start refreshing it in the background.
    pub async fn connect(upstream: &str) -> Result<Self, UpstreamError> {
        Self::connect_with(upstream, PoolSettings::default()).await
    }

    /// Like [`connect`](Self::connect) with explicit settings.
    pub async fn connect_with(upstream: &str, settings: PoolSettings) -> Result<Self, UpstreamError> {
        let target = upstream.parse()?;
        Self::with_lookup(target, settings, Arc::new(SystemLookup)).await
    }

    /// Build a pool that resolves through `lookup`.
    ///
    /// The first resolution runs before this returns; an error or an empty
    /// result fails construction and no background task is started.
    pub async fn with_lookup(
        target: UpstreamTarget,
        settings: PoolSettings,
        lookup: Arc<dyn Lookup>,
    ) -> Result<Self, UpstreamError> {
        let pool: SharedPool = Arc::new(PoolState::new());
        let resolver = Arc::new(Resolver::new(
            target,
            lookup,
            settings.resolve_timeout,
            Arc::clone(&pool),
        ));

        let endpoints = resolver
            .refresh()
            .await
            .map_err(UpstreamError::InitialResolve)?;
        if endpoints.is_empty() {
            return Err(UpstreamError::NoAddresses {
                host: resolver.target().host().to_string(),
            });
        }

        let cancel = CancellationToken::new();
        spawn_refresh_loop(
            Arc::clone(&resolver),
            settings.refresh_interval,
            cancel.clone(),
        );

        tracing::info!(
            upstream = %resolver.target(),
            addresses = endpoints.len(),
            refresh_interval = ?settings.refresh_interval,
            "upstream pool started"
        );

        Ok(Self {
            resolver,
            pool,
            cancel,
        })
    }

    /// Every known endpoint, least busy first.
    ///
    /// The returned values are copies with a zero busy count; they are only
    /// useful for picking an address and for passing back to
    /// [`acquire`](Self::acquire) / [`release`](Self::release).
    pub fn get_all(&self) -> Result<Vec<Endpoint>, PoolError> {
        self.pool.snapshot()
    }

    /// Record that an operation against `endpoint` has started.
    ///
    /// Does nothing if the pool has since been refreshed to a different
    /// address set.
    pub fn acquire(&self, endpoint: &Endpoint) {
        if !self.pool.acquire(endpoint) {
            tracing::trace!(
                address = endpoint.address(),
                version = endpoint.version(),
                "acquire on stale endpoint ignored"
            );
        }
    }

    /// Record that an operation against `endpoint` has finished.
    pub fn release(&self, endpoint: &Endpoint) {
        if !self.pool.release(endpoint) {
            tracing::trace!(
                address = endpoint.address(),
                version = endpoint.version(),
                "release on stale endpoint ignored"
            );
        }
    }

    /// Acquire `endpoint` until the returned guard is dropped.
    pub fn lease(&self, endpoint: &Endpoint) -> UsageGuard<'_> {
        self.pool.lease(endpoint)
    }

    /// Like [`lease`](Self::lease), but the guard can move into a spawned
    /// task and outlive this borrow of the handle.
    pub fn lease_owned(&self, endpoint: &Endpoint) -> OwnedUsageGuard {
        self.pool.lease_owned(endpoint)
    }

    /// Stop the background refresh.
    ///
    /// Returns immediately; the task exits at its next scheduling point.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::info!(upstream = %self.resolver.target(), "stopping upstream pool");
        }
        self.cancel.cancel();
    }

    /// The configured upstream.
    pub fn target(&self) -> &UpstreamTarget {
        self.resolver.target()
    }

    /// Current pool generation.
    pub fn version(&self) -> u64 {
        self.pool.version()
    }

    /// Fingerprint of the committed address set.
    pub fn fingerprint(&self) -> Fingerprint {
        self.pool.fingerprint()
    }
}

impl Drop for Upstream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
