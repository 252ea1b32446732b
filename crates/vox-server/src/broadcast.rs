//! Event fan-out to connected observer (dashboard) connections.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use metrics::counter;
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use vox_core::activity::ActivityRecord;
use vox_core::ids::ObserverId;
use vox_core::presence::PresenceSnapshot;
use vox_core::wire::ObserverEvent;

use crate::metrics::OBSERVER_BROADCAST_DROPS_TOTAL;

/// Maximum total lifetime message drops before forcibly disconnecting a slow
/// observer.
const MAX_TOTAL_DROPS: u64 = 100;

/// Outbound queue depth per observer.
pub const OBSERVER_QUEUE_DEPTH: usize = 32;

/// One connected observer: identity plus its bounded outbound queue.
pub struct ObserverConnection {
    /// Connection identity.
    pub id: ObserverId,
    tx: mpsc::Sender<Arc<String>>,
    drops: AtomicU64,
}

impl ObserverConnection {
    /// Wrap an outbound queue as an observer connection.
    pub fn new(id: ObserverId, tx: mpsc::Sender<Arc<String>>) -> Self {
        Self {
            id,
            tx,
            drops: AtomicU64::new(0),
        }
    }

    /// Queue a serialized frame without blocking.
    ///
    /// Returns `false` when the queue is full (the frame is dropped and the
    /// lifetime drop counter advances) or the receiver is gone.
    pub fn send(&self, frame: Arc<String>) -> bool {
        match self.tx.try_send(frame) {
            Ok(()) => true,
            Err(_) => {
                let _ = self.drops.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    /// Total frames dropped over this connection's lifetime.
    pub fn drop_count(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }
}

/// Manages presence/activity broadcasting to connected observers.
///
/// Delivery is fire-and-forget per observer: one observer's failure never
/// blocks delivery to the others and never surfaces to the caller that
/// triggered the broadcast.
pub struct Broadcaster {
    /// Connected observers indexed by connection ID.
    connections: RwLock<HashMap<ObserverId, Arc<ObserverConnection>>>,
    /// Atomic counter tracking total connections (avoids read-locking for
    /// count queries).
    active_count: AtomicUsize,
}

impl Broadcaster {
    /// Create a new broadcaster with no observers.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            active_count: AtomicUsize::new(0),
        }
    }

    /// Add an observer, atomically queueing its initial synchronization
    /// frames.
    ///
    /// `initial_frames` runs under the connection-set write lock, which all
    /// broadcasts contend on for reading: any broadcast either completes
    /// before this observer is visible, or happens after the frames it built
    /// are queued. A freshly attached observer therefore always sees its
    /// snapshot before any subsequent live event.
    pub async fn add_synced<F>(&self, connection: Arc<ObserverConnection>, initial_frames: F)
    where
        F: FnOnce() -> Vec<Arc<String>>,
    {
        let mut conns = self.connections.write().await;
        for frame in initial_frames() {
            let _ = connection.send(frame);
        }
        if conns.insert(connection.id.clone(), connection).is_none() {
            let _ = self.active_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Remove an observer by ID.
    pub async fn remove(&self, id: &ObserverId) {
        let mut conns = self.connections.write().await;
        if conns.remove(id).is_some() {
            let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Push a presence snapshot to every observer.
    pub async fn broadcast_presence(&self, snapshot: PresenceSnapshot) {
        self.broadcast_event(&ObserverEvent::PresenceSnapshot(snapshot), "presence")
            .await;
    }

    /// Push a single new activity record to every observer.
    pub async fn broadcast_activity(&self, record: &ActivityRecord) {
        self.broadcast_event(
            &ObserverEvent::ActivityEvent {
                record: record.clone(),
            },
            "activity",
        )
        .await;
    }

    /// Serialize once, fan out to all observers, remove slow ones.
    async fn broadcast_event(&self, event: &ObserverEvent, label: &str) {
        let json = match serde_json::to_string(event) {
            Ok(j) => Arc::new(j),
            Err(e) => {
                warn!(label, error = %e, "failed to serialize observer event");
                return;
            }
        };
        let mut to_remove = Vec::new();
        {
            let conns = self.connections.read().await;
            let mut recipients = 0u32;
            for conn in conns.values() {
                recipients += 1;
                if !conn.send(Arc::clone(&json)) {
                    counter!(OBSERVER_BROADCAST_DROPS_TOTAL).increment(1);
                    let drops = conn.drop_count();
                    if drops >= MAX_TOTAL_DROPS {
                        warn!(observer = %conn.id, label, drops, "disconnecting slow observer");
                        to_remove.push(conn.id.clone());
                    } else {
                        warn!(observer = %conn.id, label, total_drops = drops, "failed to queue event for observer (queue full)");
                    }
                }
            }
            debug!(label, recipients, "broadcast observer event");
        }
        if !to_remove.is_empty() {
            let mut conns = self.connections.write().await;
            for id in &to_remove {
                if conns.remove(id).is_some() {
                    let _ = self.active_count.fetch_sub(1, Ordering::Relaxed);
                }
            }
        }
    }

    /// Number of connected observers.
    pub fn observer_count(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::ids::AgentId;
    use vox_core::presence::AgentRecord;

    fn make_connection(id: &str) -> (Arc<ObserverConnection>, mpsc::Receiver<Arc<String>>) {
        let (tx, rx) = mpsc::channel(OBSERVER_QUEUE_DEPTH);
        (
            Arc::new(ObserverConnection::new(ObserverId::from(id), tx)),
            rx,
        )
    }

    fn snapshot(online: usize) -> PresenceSnapshot {
        PresenceSnapshot {
            online,
            agents: (0..online)
                .map(|i| AgentRecord::new(AgentId::from(format!("a{i}").as_str()), 1))
                .collect(),
        }
    }

    fn record() -> ActivityRecord {
        ActivityRecord::success("ok", 1, AgentId::from("a"))
    }

    #[tokio::test]
    async fn add_and_count() {
        let bc = Broadcaster::new();
        let (conn, _rx) = make_connection("o1");
        bc.add_synced(conn, Vec::new).await;
        assert_eq!(bc.observer_count(), 1);
    }

    #[tokio::test]
    async fn remove_observer() {
        let bc = Broadcaster::new();
        let (conn, _rx) = make_connection("o1");
        bc.add_synced(conn, Vec::new).await;
        bc.remove(&ObserverId::from("o1")).await;
        assert_eq!(bc.observer_count(), 0);
    }

    #[tokio::test]
    async fn remove_nonexistent_observer() {
        let bc = Broadcaster::new();
        bc.remove(&ObserverId::from("no_such")).await;
        assert_eq!(bc.observer_count(), 0);
    }

    #[tokio::test]
    async fn initial_frames_arrive_before_later_broadcasts() {
        let bc = Broadcaster::new();
        let (conn, mut rx) = make_connection("o1");
        bc.add_synced(conn, || vec![Arc::new("sync-1".to_string())])
            .await;
        bc.broadcast_presence(snapshot(1)).await;

        assert_eq!(&*rx.recv().await.unwrap(), "sync-1");
        let next = rx.recv().await.unwrap();
        assert!(next.contains("presence_snapshot"));
    }

    #[tokio::test]
    async fn presence_broadcast_reaches_all_observers() {
        let bc = Broadcaster::new();
        let (c1, mut rx1) = make_connection("o1");
        let (c2, mut rx2) = make_connection("o2");
        bc.add_synced(c1, Vec::new).await;
        bc.add_synced(c2, Vec::new).await;

        bc.broadcast_presence(snapshot(2)).await;

        let m1 = rx1.try_recv().unwrap();
        let m2 = rx2.try_recv().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&m1).unwrap();
        assert_eq!(parsed["type"], "presence_snapshot");
        assert_eq!(parsed["online"], 2);
        // Both receivers share the same serialized frame.
        assert!(Arc::ptr_eq(&m1, &m2));
    }

    #[tokio::test]
    async fn activity_broadcast_carries_single_record() {
        let bc = Broadcaster::new();
        let (conn, mut rx) = make_connection("o1");
        bc.add_synced(conn, Vec::new).await;

        bc.broadcast_activity(&record()).await;

        let msg = rx.recv().await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&msg).unwrap();
        assert_eq!(parsed["type"], "activity_event");
        assert_eq!(parsed["record"]["type"], "success");
        assert_eq!(parsed["record"]["agentId"], "a");
    }

    #[tokio::test]
    async fn broadcast_to_empty_set_does_not_panic() {
        let bc = Broadcaster::new();
        bc.broadcast_presence(snapshot(0)).await;
        bc.broadcast_activity(&record()).await;
    }

    #[tokio::test]
    async fn slow_observer_does_not_block_fast_one() {
        let bc = Broadcaster::new();
        // Queue depth 1 and never drained: every later frame drops.
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let slow = Arc::new(ObserverConnection::new(ObserverId::from("slow"), slow_tx));
        let (fast, mut fast_rx) = make_connection("fast");
        bc.add_synced(slow, Vec::new).await;
        bc.add_synced(fast, Vec::new).await;

        for _ in 0..10 {
            bc.broadcast_activity(&record()).await;
            while fast_rx.try_recv().is_ok() {}
        }
        // Fast observer stayed connected and kept receiving.
        assert_eq!(bc.observer_count(), 2);
    }

    #[tokio::test]
    async fn slow_observer_disconnected_after_drop_threshold() {
        let bc = Broadcaster::new();
        let (slow_tx, _slow_rx) = mpsc::channel(1);
        let slow = Arc::new(ObserverConnection::new(ObserverId::from("slow"), slow_tx));
        let (fast, mut fast_rx) = make_connection("fast");
        bc.add_synced(slow, Vec::new).await;
        bc.add_synced(fast, Vec::new).await;

        // First broadcast fills the slow queue; MAX_TOTAL_DROPS more exceed
        // the threshold.
        bc.broadcast_presence(snapshot(1)).await;
        for _ in 0..MAX_TOTAL_DROPS {
            bc.broadcast_presence(snapshot(1)).await;
            while fast_rx.try_recv().is_ok() {}
        }

        assert_eq!(bc.observer_count(), 1);
    }

    #[tokio::test]
    async fn add_same_id_overwrites_without_double_count() {
        let bc = Broadcaster::new();
        let (c1, _rx1) = make_connection("same");
        let (c2, _rx2) = make_connection("same");
        bc.add_synced(c1, Vec::new).await;
        bc.add_synced(c2, Vec::new).await;
        assert_eq!(bc.observer_count(), 1);
    }

    #[tokio::test]
    async fn connection_send_reports_queue_full() {
        let (tx, _rx) = mpsc::channel(1);
        let conn = ObserverConnection::new(ObserverId::from("o"), tx);
        assert!(conn.send(Arc::new("one".into())));
        assert!(!conn.send(Arc::new("two".into())));
        assert_eq!(conn.drop_count(), 1);
    }

    #[test]
    fn slow_observer_threshold_constant_value() {
        assert_eq!(MAX_TOTAL_DROPS, 100);
    }
}
