//! Upstream target parsing and pool timing settings.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::UpstreamError;

/// Default bound on a single hostname lookup.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default delay between background refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(3);

/// The configured upstream: a hostname and an optional fixed port.
///
/// Accepted forms are `host`, `host:port`, `[v6]`, `[v6]:port` and a bare
/// IPv6 literal. An empty port after a trailing `:` means no port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    host: String,
    port: Option<String>,
}

impl UpstreamTarget {
    /// Hostname (or IP literal) to resolve.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port appended to every resolved address, if any.
    pub fn port(&self) -> Option<&str> {
        self.port.as_deref()
    }
}

impl FromStr for UpstreamTarget {
    type Err = UpstreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (host, port) = if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| UpstreamError::InvalidTarget(s.to_string()))?;
            let port = match tail {
                "" => None,
                tail => Some(
                    tail.strip_prefix(':')
                        .ok_or_else(|| UpstreamError::InvalidTarget(s.to_string()))?,
                ),
            };
            (host, port)
        } else if s.matches(':').count() > 1 {
            (s, None)
        } else {
            match s.split_once(':') {
                Some((host, port)) => (host, Some(port)),
                None => (s, None),
            }
        };

        if host.is_empty() {
            return Err(UpstreamError::InvalidTarget(s.to_string()));
        }

        Ok(Self {
            host: host.to_string(),
            port: port.filter(|p| !p.is_empty()).map(str::to_string),
        })
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bracket = self.host.contains(':');
        match (&self.port, bracket) {
            (Some(port), true) => write!(f, "[{}]:{}", self.host, port),
            (Some(port), false) => write!(f, "{}:{}", self.host, port),
            (None, _) => f.write_str(&self.host),
        }
    }
}

/// Timing knobs for resolution and the refresh loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    /// Upper bound on one lookup (default: 10s)
    pub resolve_timeout: Duration,

    /// Delay between background refreshes (default: 3s)
    pub refresh_interval: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

impl PoolSettings {
    /// Create settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the lookup timeout. Zero is ignored.
    pub fn with_resolve_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.resolve_timeout = timeout;
        }
        self
    }

    /// Set the refresh interval. Zero is ignored.
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.refresh_interval = interval;
        }
        self
    }

    /// Create settings from `DNSPOOL_RESOLVE_TIMEOUT_SECS` and
    /// `DNSPOOL_REFRESH_INTERVAL_SECS`, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(secs) = parse_secs(var("DNSPOOL_RESOLVE_TIMEOUT_SECS")) {
            settings = settings.with_resolve_timeout(Duration::from_secs(secs));
        }

        if let Some(secs) = parse_secs(var("DNSPOOL_REFRESH_INTERVAL_SECS")) {
            settings = settings.with_refresh_interval(Duration::from_secs(secs));
        }

        settings
    }
}

fn parse_secs(value: Option<String>) -> Option<u64> {
    value?.trim().parse().ok()
}
