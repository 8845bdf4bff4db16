//! Background task that keeps the pool in sync with DNS.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::resolver::Resolver;

/// Spawns a background Tokio task that re-resolves the upstream every
/// `every` until `token` is cancelled.
///
/// Failures are logged and retried on the next tick. Cancellation wins over
/// a tick that is ready at the same time; a lookup already in flight is left
/// to finish (or time out) on its own.
pub fn spawn_refresh_loop(
    resolver: Arc<Resolver>,
    every: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The caller has just resolved synchronously, so skip the immediate tick
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {}
            }

            if let Err(err) = resolver.refresh().await {
                tracing::error!(
                    host = resolver.target().host(),
                    error = %err,
                    "failed to refresh upstream addresses"
                );
            }
        }

        tracing::debug!(host = resolver.target().host(), "refresh loop stopped");
    })
}
