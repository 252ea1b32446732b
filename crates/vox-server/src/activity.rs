//! Bounded rolling log of recent activity records.

use std::collections::VecDeque;

use parking_lot::Mutex;

use vox_core::activity::ActivityRecord;

/// Maximum records retained. Insertion past this silently drops the oldest.
pub const ACTIVITY_LOG_CAPACITY: usize = 50;

/// Records pushed to a newly connected observer.
pub const RECENT_ACTIVITY_COUNT: usize = 10;

/// Append-only ring buffer of recent [`ActivityRecord`]s.
///
/// Overflow is silent: no error, no blocking, the oldest entry goes.
pub struct ActivityLog {
    entries: Mutex<VecDeque<ActivityRecord>>,
    capacity: usize,
}

impl ActivityLog {
    /// Create a log with the production capacity.
    pub fn new() -> Self {
        Self::with_capacity(ACTIVITY_LOG_CAPACITY)
    }

    /// Create a log with a custom capacity (tests).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append a record, evicting the oldest when full.
    pub fn push(&self, record: ActivityRecord) {
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            let _ = entries.pop_front();
        }
        entries.push_back(record);
    }

    /// The most recent `n` records in arrival order (oldest first).
    pub fn recent(&self, n: usize) -> Vec<ActivityRecord> {
        let entries = self.entries.lock();
        let skip = entries.len().saturating_sub(n);
        entries.iter().skip(skip).cloned().collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vox_core::ids::AgentId;

    fn record(n: u64) -> ActivityRecord {
        ActivityRecord::success(format!("entry {n}"), n, AgentId::from("a"))
    }

    #[test]
    fn push_and_recent_in_arrival_order() {
        let log = ActivityLog::new();
        for n in 0..5 {
            log.push(record(n));
        }
        let recent = log.recent(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].timestamp, 2);
        assert_eq!(recent[2].timestamp, 4);
    }

    #[test]
    fn capacity_is_never_exceeded() {
        let log = ActivityLog::new();
        for n in 0..200 {
            log.push(record(n));
        }
        assert_eq!(log.len(), ACTIVITY_LOG_CAPACITY);
    }

    #[test]
    fn insertion_fifty_one_drops_the_oldest() {
        let log = ActivityLog::new();
        for n in 0..51 {
            log.push(record(n));
        }
        let all = log.recent(ACTIVITY_LOG_CAPACITY);
        assert_eq!(all.len(), 50);
        // Record 0 is gone; 1..=50 remain in arrival order.
        assert_eq!(all[0].timestamp, 1);
        assert_eq!(all[49].timestamp, 50);
    }

    #[test]
    fn recent_on_short_log_returns_everything() {
        let log = ActivityLog::new();
        log.push(record(1));
        log.push(record(2));
        let recent = log.recent(RECENT_ACTIVITY_COUNT);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].timestamp, 1);
    }

    #[test]
    fn recent_zero_is_empty() {
        let log = ActivityLog::new();
        log.push(record(1));
        assert!(log.recent(0).is_empty());
    }

    #[test]
    fn empty_log_reports_empty() {
        let log = ActivityLog::new();
        assert!(log.is_empty());
        assert!(log.recent(10).is_empty());
    }

    #[test]
    fn custom_capacity_honored() {
        let log = ActivityLog::with_capacity(2);
        log.push(record(1));
        log.push(record(2));
        log.push(record(3));
        let all = log.recent(10);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].timestamp, 2);
    }
}
