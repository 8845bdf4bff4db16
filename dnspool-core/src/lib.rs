//! dnspool core functionality.
//!
//! This crate contains the runtime-independent parts of an upstream pool:
//! the endpoint model, address-set fingerprinting, the lock-protected
//! registry with its version-stamped identity rules, and least-busy
//! selection. Resolution and the refresh task live in the `dnspool` crate.

pub mod domain;
pub mod error;
pub mod load_balancer;

pub use domain::endpoint::Endpoint;
pub use domain::fingerprint::{AddressSet, Fingerprint};
pub use domain::pool::{CommitOutcome, PoolState, SharedPool};
pub use error::PoolError;
pub use load_balancer::guard::{OwnedUsageGuard, UsageGuard};
pub use load_balancer::selector::order_least_busy;
