//! Shared helpers for unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use vox_dictation::{ProcessError, WorkOutput, WorkProcessor};
use vox_settings::LivenessSettings;

use crate::state::AppState;

/// A processor fed from a queue of canned outcomes.
///
/// With an empty queue every call succeeds with `"stub"` text, so tests that
/// don't care about the outcome need no setup.
#[derive(Default)]
pub struct StubProcessor {
    outcomes: Mutex<VecDeque<Result<WorkOutput, ProcessError>>>,
}

impl StubProcessor {
    /// Queue the outcome for the next `process` call.
    pub fn push(&self, outcome: Result<WorkOutput, ProcessError>) {
        self.outcomes.lock().push_back(outcome);
    }

    /// A processor that will answer its next call with `text`.
    pub fn succeeding(text: &str) -> Self {
        let stub = Self::default();
        stub.push(Ok(WorkOutput {
            text: text.to_string(),
            refined_text: None,
        }));
        stub
    }

    /// A processor that will fail its next call with `message`.
    pub fn failing(message: &str) -> Self {
        let stub = Self::default();
        stub.push(Err(ProcessError::Upstream(message.to_string())));
        stub
    }
}

#[async_trait]
impl WorkProcessor for StubProcessor {
    async fn process(&self, _payload: Value) -> Result<WorkOutput, ProcessError> {
        self.outcomes.lock().pop_front().unwrap_or_else(|| {
            Ok(WorkOutput {
                text: "stub".to_string(),
                refined_text: None,
            })
        })
    }
}

/// State around a stub processor with default liveness thresholds.
pub fn state_with_stub(stub: StubProcessor) -> Arc<AppState> {
    Arc::new(AppState::new(
        Arc::new(stub),
        LivenessSettings::default(),
        CancellationToken::new(),
    ))
}
