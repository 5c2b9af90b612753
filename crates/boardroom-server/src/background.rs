//! Background tasks for the boardroom server.
//!
//! Includes:
//! - Pruning idle meeting sessions.

use crate::AppState;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

/// Starts the idle session pruning task.
///
/// This task runs indefinitely, periodically evicting sessions that have
/// been idle past the threshold and have no live connection. Sessions with a
/// live WebSocket are never pruned regardless of idleness.
pub async fn start_pruning_task(state: Arc<AppState>, threshold_seconds: u64) {
    if threshold_seconds == 0 {
        tracing::warn!("session pruning task disabled (threshold=0)");
        return;
    }

    // Run check every 60 seconds or threshold/2, whichever is smaller (but min 1s)
    let interval_seconds = (threshold_seconds / 2).clamp(1, 60);
    let interval = Duration::from_secs(interval_seconds);

    tracing::info!(
        threshold_seconds,
        interval_seconds,
        "starting session pruning task"
    );

    loop {
        sleep(interval).await;

        let live = state.connection_manager.live_sessions().await;
        let pruned = state
            .session_store
            .prune_idle(threshold_seconds, &live)
            .await;
        if !pruned.is_empty() {
            tracing::info!(count = pruned.len(), "pruned idle sessions");
        }
    }
}
