//! Scoped usage tracking.

use crate::domain::endpoint::Endpoint;
use crate::domain::pool::{PoolState, SharedPool};

/// A RAII guard that attributes one in-flight operation to an endpoint and
/// gives it back when dropped.
///
/// If the pool was refreshed in between and the endpoint's identity is gone,
/// both the increment and the decrement are silent no-ops.
///
/// The guard borrows the pool, so it cannot outlive the caller's scope. Use
/// [`OwnedUsageGuard`] to hand the lease to a spawned task.
#[must_use = "dropping the guard immediately releases the endpoint"]
#[derive(Debug)]
pub struct UsageGuard<'a> {
    pool: &'a PoolState,
    endpoint: Endpoint,
}

impl<'a> UsageGuard<'a> {
    pub(crate) fn new(pool: &'a PoolState, endpoint: &Endpoint) -> Self {
        pool.acquire(endpoint);
        Self {
            pool,
            endpoint: endpoint.clone(),
        }
    }

    /// The endpoint this guard is holding.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl<'a> Drop for UsageGuard<'a> {
    fn drop(&mut self) {
        self.pool.release(&self.endpoint);
    }
}

/// A [`UsageGuard`] that owns a reference to the pool instead of borrowing it.
#[must_use = "dropping the guard immediately releases the endpoint"]
#[derive(Debug)]
pub struct OwnedUsageGuard {
    pool: SharedPool,
    endpoint: Endpoint,
}

impl OwnedUsageGuard {
    pub(crate) fn new(pool: SharedPool, endpoint: &Endpoint) -> Self {
        pool.acquire(endpoint);
        Self {
            pool,
            endpoint: endpoint.clone(),
        }
    }

    /// The endpoint this guard is holding.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl Drop for OwnedUsageGuard {
    fn drop(&mut self) {
        self.pool.release(&self.endpoint);
    }
}
