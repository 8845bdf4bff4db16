//! dnspool
//!
//! Keeps a pool of upstream endpoints in sync with DNS and hands out a
//! least-busy ordering to pick from. A pool is built from an upstream string
//! (`host` or `host:port`), resolved once up front, and then re-resolved in
//! the background on a fixed interval until stopped.
//!
//! Resolution failures during refresh are reported through `tracing` and
//! never reach callers.

pub mod config;
pub mod error;
pub mod refresh;
pub mod resolver;
pub mod upstream;

pub use config::{PoolSettings, UpstreamTarget};
pub use dnspool_core::{Endpoint, Fingerprint, OwnedUsageGuard, PoolError, UsageGuard};
pub use error::{ResolveError, UpstreamError};
pub use resolver::{Lookup, Resolver, SystemLookup};
pub use upstream::Upstream;
