//! Work forwarding: one submission in, one result back, one activity record.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use serde_json::Value;
use tracing::{info, warn};

use vox_core::activity::ActivityRecord;
use vox_core::ids::AgentId;
use vox_core::time::epoch_ms;
use vox_core::wire::AgentReply;

use crate::metrics::{WORK_DURATION_SECONDS, WORK_FAILURES_TOTAL, WORK_REQUESTS_TOTAL};
use crate::state::AppState;

/// Forward one unit of work from `agent_id` to the processing collaborator
/// and relay the outcome.
///
/// Runs on its own task per submission: the external call may take
/// arbitrarily long, and no registry or log lock is held across it. A
/// producer that disconnects mid-flight simply never receives the reply;
/// the activity record is appended either way.
pub async fn forward_work(state: Arc<AppState>, agent_id: AgentId, payload: Value) {
    counter!(WORK_REQUESTS_TOTAL).increment(1);
    state.touch(&agent_id);

    let started = Instant::now();
    let outcome = state.processor.process(payload).await;
    histogram!(WORK_DURATION_SECONDS).record(started.elapsed().as_secs_f64());

    match outcome {
        Ok(output) => {
            info!(agent = %agent_id, "work completed");
            state
                .reply_to(
                    &agent_id,
                    AgentReply::work_success(output.text, output.refined_text),
                )
                .await;
            state
                .record_activity(ActivityRecord::success(
                    "Dictation completed successfully",
                    epoch_ms(),
                    agent_id,
                ))
                .await;
        }
        Err(e) => {
            counter!(WORK_FAILURES_TOTAL).increment(1);
            let message = e.to_string();
            warn!(agent = %agent_id, error = %message, "work failed");
            state
                .reply_to(&agent_id, AgentReply::work_failure(message.clone()))
                .await;
            state
                .record_activity(ActivityRecord::error(
                    format!("Dictation failed: {message}"),
                    epoch_ms(),
                    agent_id,
                ))
                .await;
        }
    }
}
