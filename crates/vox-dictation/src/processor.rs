//! The processing collaborator trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::types::{ProcessError, WorkOutput};

/// A collaborator that turns an opaque work payload into text.
///
/// Implementations must be safe to invoke repeatedly and concurrently for
/// different payloads with no shared state between calls. The call may take
/// arbitrarily long; callers must not hold any lock across it.
#[async_trait]
pub trait WorkProcessor: Send + Sync {
    /// Process one unit of work.
    async fn process(&self, payload: Value) -> Result<WorkOutput, ProcessError>;
}
