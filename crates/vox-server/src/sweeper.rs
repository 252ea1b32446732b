//! Periodic liveness checks.
//!
//! Two independent tasks, deliberately not merged: the soft-inactivity check
//! is a warning-only operational signal, while the hard-staleness sweep is
//! the only state-mutating action. Their thresholds and effects differ.
//!
//! The per-tick logic is factored into [`soft_check_once`] and
//! [`hard_sweep_once`] so it can be driven with an explicit `now` in tests.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use vox_core::ids::AgentId;
use vox_core::time::epoch_ms;

use crate::state::AppState;

/// Log a warning for every agent silent longer than the soft interval.
///
/// No state change, no eviction. Returns how many agents were flagged.
pub fn soft_check_once(state: &AppState, now: u64) -> usize {
    let overdue = state
        .registry
        .inactive_agents(now, state.liveness.heartbeat_interval_ms);
    for (id, idle_ms) in &overdue {
        warn!(agent = %id, idle_ms, "agent inactive past soft threshold");
    }
    overdue.len()
}

/// Evict every agent silent longer than the stale threshold.
///
/// Each eviction terminates the connection at the transport level, removes
/// the record, and broadcasts the updated presence view. Returns the evicted
/// ids.
pub async fn hard_sweep_once(state: &Arc<AppState>, now: u64) -> Vec<AgentId> {
    let stale = state
        .registry
        .inactive_agents(now, state.liveness.stale_threshold_ms);
    for (id, idle_ms) in &stale {
        warn!(agent = %id, idle_ms, "evicting stale agent");
        state.evict_agent(id).await;
    }
    stale.into_iter().map(|(id, _)| id).collect()
}

/// Spawn both periodic tasks. Each stops when the state's shutdown token
/// fires.
pub fn spawn(state: Arc<AppState>) -> (JoinHandle<()>, JoinHandle<()>) {
    let soft = tokio::spawn(soft_loop(Arc::clone(&state)));
    let hard = tokio::spawn(hard_loop(state));
    (soft, hard)
}

async fn soft_loop(state: Arc<AppState>) {
    let period = Duration::from_millis(state.liveness.heartbeat_interval_ms);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            () = state.shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let _ = soft_check_once(&state, epoch_ms());
            }
        }
    }
    debug!("soft-inactivity check stopped");
}

async fn hard_loop(state: Arc<AppState>) {
    // Sweeping at half the threshold bounds how long a stale record can
    // outlive the threshold itself.
    let period = Duration::from_millis(state.liveness.stale_threshold_ms / 2);
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            () = state.shutdown.cancelled() => break,
            _ = ticker.tick() => {
                let _ = hard_sweep_once(&state, epoch_ms()).await;
            }
        }
    }
    debug!("hard-staleness sweep stopped");
}
