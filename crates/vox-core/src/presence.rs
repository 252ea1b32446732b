//! Presence metadata for connected agents.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// Liveness metadata for one live agent connection.
///
/// Owned exclusively by the presence registry: created on connect, refreshed
/// on every inbound signal, deleted on disconnect or eviction. `connected`
/// is always `true` while the record exists; absence from the registry is
/// what encodes "disconnected".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    /// Connection identity, unique per live connection.
    pub id: AgentId,
    /// Present in the registry, hence connected.
    pub connected: bool,
    /// Epoch-ms timestamp of the last received signal (work or ping).
    pub last_activity: u64,
}

impl AgentRecord {
    /// A fresh record for a connection that just signalled at `now`.
    pub fn new(id: AgentId, now: u64) -> Self {
        Self {
            id,
            connected: true,
            last_activity: now,
        }
    }

    /// Refresh `last_activity`, never moving it backwards.
    pub fn refresh(&mut self, now: u64) {
        self.last_activity = self.last_activity.max(now);
    }
}

/// Point-in-time view of every connected agent, derived for observers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSnapshot {
    /// Number of currently connected agents.
    pub online: usize,
    /// The records themselves. No ordering guarantee.
    pub agents: Vec<AgentRecord>,
}
