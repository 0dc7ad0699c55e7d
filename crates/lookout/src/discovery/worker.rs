//! Periodic re-discovery.

use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior};

use crate::state::AppState;

/// Background worker that refreshes the endpoint catalog every `interval`
///
/// A failed pass keeps the previous catalog.
pub async fn rediscovery_worker(
    state: AppState,
    interval: Duration,
    mut shutdown: tokio::sync::broadcast::Receiver<()>,
) {
    tracing::info!(interval_secs = interval.as_secs(), "🔭 Re-discovery worker started");

    let mut ticker = rediscovery_ticker(interval);
    // The first tick completes immediately; startup already ran a pass
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = state.refresh_endpoints().await {
                    tracing::warn!(
                        namespace = e.namespace().unwrap_or("-"),
                        error = %e,
                        "Re-discovery failed, keeping previous endpoints"
                    );
                }
            }
            _ = shutdown.recv() => {
                tracing::info!("🔭 Re-discovery worker shutting down...");
                break;
            }
        }
    }
}

/// Ticks every `interval`; a pass that overruns pushes the next tick back
/// instead of queueing catch-up passes
fn rediscovery_ticker(interval: Duration) -> Interval {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
