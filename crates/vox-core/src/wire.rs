//! Wire message types.
//!
//! Two fully isolated vocabularies, one per connection class:
//!
//! - **Agent channel**: [`AgentMessage`] inbound, [`AgentReply`] outbound.
//! - **Observer channel**: [`ObserverEvent`] outbound only (the channel is
//!   passive from the server's perspective).
//!
//! All frames are JSON, discriminated by a `type` tag, with camelCase field
//! names.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::activity::ActivityRecord;
use crate::presence::PresenceSnapshot;

/// Messages an agent sends to the server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentMessage {
    /// Submit a unit of work. The payload is opaque to the coordinator and
    /// forwarded verbatim to the processing collaborator.
    SubmitWork {
        /// Opaque work payload.
        payload: Value,
    },

    /// Liveness ping. Refreshes presence, answered with [`AgentReply::Pong`].
    Ping,
}

/// Messages the server sends back to an agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentReply {
    /// Outcome of a submitted unit of work.
    WorkResult {
        /// Whether processing succeeded.
        success: bool,
        /// Transcribed text on success.
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        /// Refined text, when the collaborator produced one.
        #[serde(rename = "refinedText", skip_serializing_if = "Option::is_none")]
        refined_text: Option<String>,
        /// Human-readable error on failure.
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Answer to [`AgentMessage::Ping`].
    Pong,
}

impl AgentReply {
    /// A successful work result.
    pub fn work_success(text: String, refined_text: Option<String>) -> Self {
        Self::WorkResult {
            success: true,
            text: Some(text),
            refined_text,
            error: None,
        }
    }

    /// A failed work result carrying a human-readable error.
    pub fn work_failure(error: impl Into<String>) -> Self {
        Self::WorkResult {
            success: false,
            text: None,
            refined_text: None,
            error: Some(error.into()),
        }
    }
}

/// Messages the server pushes to observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObserverEvent {
    /// Full presence view. Sent on observer connect and on every membership
    /// change.
    PresenceSnapshot(PresenceSnapshot),

    /// The most recent activity records (up to 10). Sent once, on connect.
    RecentActivity {
        /// Newest-last records.
        records: Vec<ActivityRecord>,
    },

    /// A single new activity record.
    ActivityEvent {
        /// The record that was just appended.
        record: ActivityRecord,
    },
}
