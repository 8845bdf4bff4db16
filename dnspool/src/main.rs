//! dnspool
//!
//! Resolves an upstream hostname, keeps it refreshed in the background and
//! periodically logs the least-busy ordering a forwarder would pick from.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dnspool::{PoolSettings, Upstream};
use tokio::time;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Upstream endpoint pool
///
/// Periodically re-resolves an upstream and reports its least-busy ordering.
#[derive(Parser, Debug)]
#[command(name = "dnspool")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Upstream to resolve: `host` or `host:port`
    #[arg(short, long, env = "DNSPOOL_UPSTREAM")]
    upstream: String,

    /// Seconds between background refreshes (overrides DNSPOOL_REFRESH_INTERVAL_SECS)
    #[arg(long)]
    refresh_interval_secs: Option<u64>,

    /// Seconds before a single lookup is abandoned (overrides DNSPOOL_RESOLVE_TIMEOUT_SECS)
    #[arg(long)]
    resolve_timeout_secs: Option<u64>,

    /// Log level used when RUST_LOG is not set: trace, debug, info, warn, error
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    let mut settings = PoolSettings::from_env();
    if let Some(secs) = args.refresh_interval_secs {
        settings = settings.with_refresh_interval(Duration::from_secs(secs));
    }
    if let Some(secs) = args.resolve_timeout_secs {
        settings = settings.with_resolve_timeout(Duration::from_secs(secs));
    }

    let upstream = Upstream::connect_with(&args.upstream, settings.clone())
        .await
        .with_context(|| format!("failed to start pool for {}", args.upstream))?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut report = time::interval(settings.refresh_interval);
    loop {
        tokio::select! {
            res = &mut shutdown => {
                res.context("failed to listen for ctrl-c")?;
                break;
            }
            _ = report.tick() => match upstream.get_all() {
                Ok(endpoints) => {
                    let order: Vec<&str> = endpoints.iter().map(|e| e.address()).collect();
                    tracing::info!(
                        version = upstream.version(),
                        fingerprint = %upstream.fingerprint(),
                        order = ?order,
                        "least-busy ordering"
                    );
                }
                Err(err) => tracing::warn!(error = %err, "no endpoints available"),
            },
        }
    }

    upstream.stop();
    tracing::info!("shutting down");
    Ok(())
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}
