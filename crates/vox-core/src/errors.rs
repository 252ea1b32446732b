//! Error hierarchy shared across the coordinator.

use thiserror::Error;

/// Errors raised inside the coordinator core.
///
/// None of these are fatal to the process: transport and message errors are
/// connection-local and resolve to cleanup plus a log line.
#[derive(Debug, Error)]
pub enum VoxError {
    /// An inbound frame was not valid JSON for its channel's vocabulary.
    #[error("malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),

    /// The underlying connection failed mid-conversation.
    #[error("transport error: {0}")]
    Transport(String),
}
