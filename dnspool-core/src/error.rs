//! Errors surfaced by the endpoint registry.

use thiserror::Error;

/// Failures returned to callers of [`PoolState`](crate::domain::pool::PoolState).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No endpoints are currently known.
    #[error("no upstream hosts")]
    Empty,
}
