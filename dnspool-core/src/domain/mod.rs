//! Domain models for resolved upstreams.

pub mod endpoint;
pub mod fingerprint;
pub mod pool;
