//! Error types for resolution and pool construction.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// A single hostname lookup failed.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The lookup did not finish within the configured bound.
    #[error("resolving {host} timed out after {after:?}")]
    Timeout {
        /// Hostname being resolved.
        host: String,
        /// The bound that was exceeded.
        after: Duration,
    },

    /// The system resolver returned an error.
    #[error("lookup of {host} failed")]
    Lookup {
        /// Hostname being resolved.
        host: String,
        /// Underlying resolver error.
        #[source]
        source: io::Error,
    },
}

/// Construction of an [`Upstream`](crate::upstream::Upstream) failed.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// The upstream string is malformed or has no usable host.
    #[error("malformed upstream {0:?}: expected host, host:port or [ipv6]:port")]
    InvalidTarget(String),

    /// The synchronous first resolution failed.
    #[error("failed initial resolution of upstream hostname")]
    InitialResolve(#[source] ResolveError),

    /// The first resolution succeeded but returned no addresses.
    #[error("could not resolve {host}: no addresses")]
    NoAddresses {
        /// Hostname that resolved to nothing.
        host: String,
    },
}
