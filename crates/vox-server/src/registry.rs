//! Presence registry: liveness metadata for every connected agent.

use std::collections::HashMap;

use parking_lot::Mutex;

use vox_core::ids::AgentId;
use vox_core::presence::{AgentRecord, PresenceSnapshot};

/// In-memory map of live agent identities to liveness metadata.
///
/// All access goes through one mutex; the lock is never held across an await
/// point, and readers always get a consistent copy, never a live iteration.
#[derive(Default)]
pub struct PresenceRegistry {
    records: Mutex<HashMap<AgentId, AgentRecord>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or refresh a record's `last_activity`.
    ///
    /// A refresh never moves `last_activity` backwards.
    pub fn upsert(&self, id: &AgentId, now: u64) {
        let mut records = self.records.lock();
        match records.get_mut(id) {
            Some(record) => record.refresh(now),
            None => {
                let _ = records.insert(id.clone(), AgentRecord::new(id.clone(), now));
            }
        }
    }

    /// Delete a record. Removing an absent id is a no-op, not an error.
    ///
    /// Returns whether a record was actually present.
    pub fn remove(&self, id: &AgentId) -> bool {
        self.records.lock().remove(id).is_some()
    }

    /// Number of currently-present records (the "online" count).
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Consistent point-in-time copy of all records. No ordering guarantee.
    pub fn snapshot(&self) -> PresenceSnapshot {
        let records = self.records.lock();
        PresenceSnapshot {
            online: records.len(),
            agents: records.values().cloned().collect(),
        }
    }

    /// Agents whose silence exceeds `threshold_ms` at time `now`, with how
    /// long each has been idle.
    pub fn inactive_agents(&self, now: u64, threshold_ms: u64) -> Vec<(AgentId, u64)> {
        let records = self.records.lock();
        records
            .values()
            .filter_map(|r| {
                let idle = now.saturating_sub(r.last_activity);
                (idle > threshold_ms).then(|| (r.id.clone(), idle))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> AgentId {
        AgentId::from(s)
    }

    #[test]
    fn upsert_creates_then_count_tracks() {
        let reg = PresenceRegistry::new();
        assert_eq!(reg.count(), 0);
        reg.upsert(&id("a"), 100);
        reg.upsert(&id("b"), 100);
        assert_eq!(reg.count(), 2);
    }

    #[test]
    fn upsert_same_id_does_not_double_count() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("a"), 100);
        reg.upsert(&id("a"), 200);
        assert_eq!(reg.count(), 1);
    }

    #[test]
    fn remove_is_idempotent() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("a"), 100);
        assert!(reg.remove(&id("a")));
        assert!(!reg.remove(&id("a")));
        assert!(!reg.remove(&id("never-existed")));
        assert_eq!(reg.count(), 0);
    }

    #[test]
    fn count_tracks_connect_disconnect_churn() {
        let reg = PresenceRegistry::new();
        for i in 0..10 {
            reg.upsert(&id(&format!("a{i}")), 100);
        }
        assert_eq!(reg.count(), 10);
        for i in 0..5 {
            let _ = reg.remove(&id(&format!("a{i}")));
        }
        assert_eq!(reg.count(), 5);
    }

    #[test]
    fn last_activity_is_monotonic_under_refresh() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("a"), 500);
        reg.upsert(&id("a"), 300); // out-of-order refresh must not rewind
        reg.upsert(&id("a"), 800);
        reg.upsert(&id("a"), 700);
        let snap = reg.snapshot();
        assert_eq!(snap.agents[0].last_activity, 800);
    }

    #[test]
    fn snapshot_is_a_copy_not_a_view() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("a"), 100);
        let snap = reg.snapshot();
        let _ = reg.remove(&id("a"));
        // The earlier snapshot is unaffected by the mutation.
        assert_eq!(snap.online, 1);
        assert_eq!(snap.agents.len(), 1);
        assert_eq!(reg.snapshot().online, 0);
    }

    #[test]
    fn snapshot_records_are_connected() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("a"), 100);
        assert!(reg.snapshot().agents[0].connected);
    }

    #[test]
    fn inactive_agents_filters_by_threshold() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("fresh"), 10_000);
        reg.upsert(&id("stale"), 1_000);
        let overdue = reg.inactive_agents(11_000, 5_000);
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].0, id("stale"));
        assert_eq!(overdue[0].1, 10_000);
    }

    #[test]
    fn inactive_agents_boundary_is_strictly_greater() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("a"), 1_000);
        // idle == threshold does not trip the check
        assert!(reg.inactive_agents(6_000, 5_000).is_empty());
        assert_eq!(reg.inactive_agents(6_001, 5_000).len(), 1);
    }

    #[test]
    fn inactive_agents_tolerates_future_last_activity() {
        let reg = PresenceRegistry::new();
        reg.upsert(&id("a"), 10_000);
        // Clock skew: now earlier than last_activity saturates to zero idle.
        assert!(reg.inactive_agents(5_000, 1_000).is_empty());
    }
}
