//! Activity records for the rolling dashboard feed.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// What an activity entry describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// An agent started capturing audio.
    Recording,
    /// A work payload is being processed.
    Processing,
    /// A unit of work completed successfully.
    Success,
    /// A unit of work failed.
    Error,
}

/// One immutable entry in the rolling activity log.
///
/// `agent_id` is a weak back-reference: it names the agent that caused the
/// entry but never implies that agent still exists.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    /// Entry category.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Human-readable description.
    pub message: String,
    /// Epoch-ms creation time.
    pub timestamp: u64,
    /// Agent that caused the entry, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<AgentId>,
}

impl ActivityRecord {
    /// A `success` entry attributed to `agent_id`.
    pub fn success(message: impl Into<String>, timestamp: u64, agent_id: AgentId) -> Self {
        Self {
            kind: ActivityKind::Success,
            message: message.into(),
            timestamp,
            agent_id: Some(agent_id),
        }
    }

    /// An `error` entry attributed to `agent_id`.
    pub fn error(message: impl Into<String>, timestamp: u64, agent_id: AgentId) -> Self {
        Self {
            kind: ActivityKind::Error,
            message: message.into(),
            timestamp,
            agent_id: Some(agent_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ActivityKind::Recording).unwrap(),
            "\"recording\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityKind::Error).unwrap(),
            "\"error\""
        );
    }

    #[test]
    fn record_serializes_kind_as_type() {
        let rec = ActivityRecord::success("done", 99, AgentId::from("a"));
        let val = serde_json::to_value(&rec).unwrap();
        assert_eq!(val["type"], "success");
        assert_eq!(val["message"], "done");
        assert_eq!(val["timestamp"], 99);
        assert_eq!(val["agentId"], "a");
        assert!(val.get("kind").is_none());
    }

    #[test]
    fn missing_agent_id_is_omitted() {
        let rec = ActivityRecord {
            kind: ActivityKind::Processing,
            message: "working".into(),
            timestamp: 1,
            agent_id: None,
        };
        let val = serde_json::to_value(&rec).unwrap();
        assert!(val.get("agentId").is_none());
    }

    #[test]
    fn record_round_trips() {
        let rec = ActivityRecord::error("boom", 5, AgentId::from("x"));
        let json = serde_json::to_string(&rec).unwrap();
        let back: ActivityRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }
}
