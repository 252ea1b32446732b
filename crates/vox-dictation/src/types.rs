//! Core types for the processing collaborator.

use thiserror::Error;

/// Result of processing one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOutput {
    /// The transcribed text.
    pub text: String,
    /// Refined text, when the upstream pipeline produced one.
    pub refined_text: Option<String>,
}

/// Errors that can occur while processing a unit of work.
///
/// Every variant's `Display` is a human-readable message suitable for
/// relaying verbatim to the producer that submitted the work.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The payload was rejected before reaching the upstream service.
    #[error("{0}")]
    Rejected(String),

    /// The upstream service reported a processing failure.
    #[error("{0}")]
    Upstream(String),

    /// The request never completed (connect failure, timeout).
    #[error("processing request failed: {0}")]
    Request(String),

    /// The upstream answered but the body was not the expected shape.
    #[error("invalid processing response: {0}")]
    InvalidResponse(String),
}
