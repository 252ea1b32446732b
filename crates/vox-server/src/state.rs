//! Shared application state.
//!
//! One `Arc<AppState>` is cloned into every connection task and both sweeper
//! tasks. The registry and activity log serialize their own access; the
//! agent connection table uses an async `RwLock` because eviction must reach
//! into it from the sweeper.

use std::collections::HashMap;
use std::sync::Arc;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use vox_core::activity::ActivityRecord;
use vox_core::ids::AgentId;
use vox_core::time::epoch_ms;
use vox_core::wire::{AgentReply, ObserverEvent};
use vox_dictation::WorkProcessor;
use vox_settings::LivenessSettings;

use crate::activity::{ActivityLog, RECENT_ACTIVITY_COUNT};
use crate::broadcast::Broadcaster;
use crate::metrics::{
    AGENTS_ONLINE, AGENT_DISCONNECTIONS_TOTAL, AGENT_EVICTIONS_TOTAL,
};
use crate::registry::PresenceRegistry;

/// Transport-side handle for one live agent connection.
///
/// The presence registry holds only liveness data; reply routing and forced
/// termination live here.
pub struct AgentHandle {
    replies: mpsc::Sender<AgentReply>,
    cancel: CancellationToken,
}

impl AgentHandle {
    /// Bundle a reply queue and a cancellation token.
    pub fn new(replies: mpsc::Sender<AgentReply>, cancel: CancellationToken) -> Self {
        Self { replies, cancel }
    }
}

/// Everything the coordinator shares across tasks.
pub struct AppState {
    /// Liveness metadata per connected agent.
    pub registry: PresenceRegistry,
    /// Rolling log of recent activity.
    pub activity: ActivityLog,
    /// Observer fan-out.
    pub broadcaster: Broadcaster,
    /// External processing collaborator.
    pub processor: Arc<dyn WorkProcessor>,
    /// Liveness thresholds driving the sweeper.
    pub liveness: LivenessSettings,
    /// Root cancellation: set on shutdown, parents every connection token.
    pub shutdown: CancellationToken,
    /// Renderer for `GET /metrics`, when a recorder is installed.
    pub metrics_handle: Option<PrometheusHandle>,
    agents: RwLock<HashMap<AgentId, AgentHandle>>,
}

impl AppState {
    /// Build state around a processor and liveness thresholds.
    pub fn new(
        processor: Arc<dyn WorkProcessor>,
        liveness: LivenessSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            registry: PresenceRegistry::new(),
            activity: ActivityLog::new(),
            broadcaster: Broadcaster::new(),
            processor,
            liveness,
            shutdown,
            metrics_handle: None,
            agents: RwLock::new(HashMap::new()),
        }
    }

    /// Attach a Prometheus handle for the `/metrics` endpoint.
    pub fn with_metrics_handle(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }

    /// Track a newly connected agent and broadcast the new presence view.
    pub async fn register_agent(&self, id: AgentId, handle: AgentHandle) {
        self.registry.upsert(&id, epoch_ms());
        let _ = self.agents.write().await.insert(id.clone(), handle);
        info!(agent = %id, "agent connected");
        self.presence_changed().await;
    }

    /// Refresh an agent's `last_activity` to now.
    pub fn touch(&self, id: &AgentId) {
        self.registry.upsert(id, epoch_ms());
    }

    /// Clean-disconnect path: forget the agent and broadcast, once.
    ///
    /// Safe to call after an eviction already removed the agent: the second
    /// call finds nothing and changes nothing.
    pub async fn unregister_agent(&self, id: &AgentId) {
        let had_handle = self.agents.write().await.remove(id).is_some();
        let had_record = self.registry.remove(id);
        if had_handle || had_record {
            counter!(AGENT_DISCONNECTIONS_TOTAL).increment(1);
            info!(agent = %id, "agent disconnected");
            self.presence_changed().await;
        }
    }

    /// Eviction path: terminate the transport, forget the agent, broadcast.
    pub async fn evict_agent(&self, id: &AgentId) {
        let handle = self.agents.write().await.remove(id);
        let had_record = self.registry.remove(id);
        if let Some(ref h) = handle {
            h.cancel.cancel();
        }
        if handle.is_some() || had_record {
            counter!(AGENT_EVICTIONS_TOTAL).increment(1);
            self.presence_changed().await;
        }
    }

    /// Send a reply to one agent. Sending to a disconnected agent is a
    /// no-op, not an error.
    pub async fn reply_to(&self, id: &AgentId, reply: AgentReply) {
        let tx = {
            let agents = self.agents.read().await;
            agents.get(id).map(|h| h.replies.clone())
        };
        if let Some(tx) = tx {
            // A closed receiver means the connection went away mid-flight.
            let _ = tx.send(reply).await;
        }
    }

    /// Append an activity record and push it to all observers.
    pub async fn record_activity(&self, record: ActivityRecord) {
        self.activity.push(record.clone());
        self.broadcaster.broadcast_activity(&record).await;
    }

    /// Broadcast the current presence view and refresh the online gauge.
    pub async fn presence_changed(&self) {
        let snapshot = self.registry.snapshot();
        gauge!(AGENTS_ONLINE).set(snapshot.online as f64);
        self.broadcaster.broadcast_presence(snapshot).await;
    }

    /// Serialized frames that synchronize a freshly connected observer:
    /// the presence snapshot plus up to the last 10 activity records.
    pub fn observer_sync_frames(&self) -> Vec<Arc<String>> {
        let events = [
            ObserverEvent::PresenceSnapshot(self.registry.snapshot()),
            ObserverEvent::RecentActivity {
                records: self.activity.recent(RECENT_ACTIVITY_COUNT),
            },
        ];
        events
            .iter()
            .filter_map(|event| match serde_json::to_string(event) {
                Ok(json) => Some(Arc::new(json)),
                Err(e) => {
                    warn!(error = %e, "failed to serialize observer sync frame");
                    None
                }
            })
            .collect()
    }

    /// Whether an agent is currently tracked (tests and diagnostics).
    pub async fn agent_is_tracked(&self, id: &AgentId) -> bool {
        self.agents.read().await.contains_key(id)
    }
}
