//! Producer (agent) channel: connection lifecycle and message dispatch.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use metrics::counter;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use vox_core::errors::VoxError;
use vox_core::ids::AgentId;
use vox_core::wire::{AgentMessage, AgentReply};

use crate::forwarder::forward_work;
use crate::metrics::AGENT_CONNECTIONS_TOTAL;
use crate::state::{AgentHandle, AppState};

/// Outbound reply queue depth per agent.
const AGENT_QUEUE_DEPTH: usize = 32;

/// Upgrade handler for `GET /agent`.
pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle(socket, state))
}

/// Per-connection task: one read loop, one outbound queue, one cancel token.
async fn handle(socket: WebSocket, state: Arc<AppState>) {
    counter!(AGENT_CONNECTIONS_TOTAL).increment(1);

    let id = AgentId::generate();
    let (replies_tx, mut replies_rx) = mpsc::channel::<AgentReply>(AGENT_QUEUE_DEPTH);
    let cancel = state.shutdown.child_token();
    state
        .register_agent(id.clone(), AgentHandle::new(replies_tx, cancel.clone()))
        .await;

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            () = cancel.cancelled() => {
                // Eviction or shutdown: terminate at the transport level.
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            reply = replies_rx.recv() => {
                let Some(reply) = reply else { break };
                match serde_json::to_string(&reply) {
                    Ok(json) => {
                        if sink.send(Message::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!(agent = %id, error = %e, "failed to serialize reply"),
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        dispatch(&state, &id, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(agent = %id, "agent closed connection");
                        break;
                    }
                    Some(Ok(_)) => {} // binary and transport ping/pong: ignored
                    Some(Err(e)) => {
                        let err = VoxError::Transport(e.to_string());
                        warn!(agent = %id, error = %err, "agent connection failed");
                        break;
                    }
                }
            }
        }
    }

    state.unregister_agent(&id).await;
}

/// Parse one inbound frame and act on it. Malformed frames are logged and
/// dropped; they never take the connection down.
async fn dispatch(state: &Arc<AppState>, id: &AgentId, text: &str) {
    match serde_json::from_str::<AgentMessage>(text) {
        Ok(AgentMessage::SubmitWork { payload }) => {
            debug!(agent = %id, "work submission received");
            // Each submission gets its own task so a slow collaborator call
            // never blocks this connection's read loop.
            let _ = tokio::spawn(forward_work(Arc::clone(state), id.clone(), payload));
        }
        Ok(AgentMessage::Ping) => {
            state.touch(id);
            state.reply_to(id, AgentReply::Pong).await;
        }
        Err(e) => {
            let err = VoxError::from(e);
            warn!(agent = %id, error = %err, "ignoring malformed agent frame");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{state_with_stub, StubProcessor};
    use tokio_util::sync::CancellationToken;

    async fn connect(state: &Arc<AppState>, id: &str) -> mpsc::Receiver<AgentReply> {
        let (tx, rx) = mpsc::channel(8);
        state
            .register_agent(
                AgentId::from(id),
                AgentHandle::new(tx, CancellationToken::new()),
            )
            .await;
        rx
    }

    #[tokio::test]
    async fn ping_refreshes_and_answers_pong() {
        let state = state_with_stub(StubProcessor::default());
        let mut rx = connect(&state, "a").await;
        let id = AgentId::from("a");
        let before = state.registry.snapshot().agents[0].last_activity;

        dispatch(&state, &id, r#"{"type":"ping"}"#).await;

        assert_eq!(rx.recv().await.unwrap(), AgentReply::Pong);
        let after = state.registry.snapshot().agents[0].last_activity;
        assert!(after >= before);
    }

    #[tokio::test]
    async fn submit_work_eventually_replies_with_result() {
        let state = state_with_stub(StubProcessor::succeeding("hello"));
        let mut rx = connect(&state, "a").await;
        let id = AgentId::from("a");

        dispatch(&state, &id, r#"{"type":"submit_work","payload":{"audio":"AA"}}"#).await;

        // The forwarder runs on its own task; the reply arrives async.
        let reply = rx.recv().await.unwrap();
        assert!(
            matches!(reply, AgentReply::WorkResult { success: true, ref text, .. } if text.as_deref() == Some("hello"))
        );
    }

    #[tokio::test]
    async fn malformed_frame_is_ignored() {
        let state = state_with_stub(StubProcessor::default());
        let mut rx = connect(&state, "a").await;
        let id = AgentId::from("a");

        dispatch(&state, &id, "{not json").await;
        dispatch(&state, &id, r#"{"type":"no_such_kind"}"#).await;

        assert!(rx.try_recv().is_err(), "no reply for malformed frames");
        assert_eq!(state.registry.count(), 1, "connection state untouched");
    }

    #[tokio::test]
    async fn observer_vocabulary_does_not_parse_on_agent_channel() {
        let state = state_with_stub(StubProcessor::default());
        let mut rx = connect(&state, "a").await;
        let id = AgentId::from("a");

        dispatch(&state, &id, r#"{"type":"presence_snapshot","online":0,"agents":[]}"#).await;
        assert!(rx.try_recv().is_err());
    }
}
