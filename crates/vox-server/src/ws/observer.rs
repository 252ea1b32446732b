//! Observer (dashboard) channel: passive, push-only.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use vox_core::ids::ObserverId;

use crate::broadcast::{ObserverConnection, OBSERVER_QUEUE_DEPTH};
use crate::metrics::{OBSERVERS_ONLINE, OBSERVER_CONNECTIONS_TOTAL};
use crate::state::AppState;

/// Upgrade handler for `GET /ui`.
pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle(socket, state))
}

/// Per-connection task: drain the outbound queue into the socket.
///
/// The first frames an observer ever receives are its synchronization pair
/// (presence snapshot, recent activity), queued atomically with set
/// membership so no live event can slip in front of them.
async fn handle(socket: WebSocket, state: Arc<AppState>) {
    counter!(OBSERVER_CONNECTIONS_TOTAL).increment(1);

    let id = ObserverId::generate();
    let (tx, mut rx) = mpsc::channel(OBSERVER_QUEUE_DEPTH);
    let connection = Arc::new(ObserverConnection::new(id.clone(), tx));
    state
        .broadcaster
        .add_synced(connection, || state.observer_sync_frames())
        .await;
    gauge!(OBSERVERS_ONLINE).set(state.broadcaster.observer_count() as f64);
    debug!(observer = %id, "observer connected");

    let (mut sink, mut stream) = socket.split();
    loop {
        tokio::select! {
            () = state.shutdown.cancelled() => {
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            frame = rx.recv() => {
                // None means the broadcaster dropped us as a slow observer.
                let Some(frame) = frame else { break };
                if sink.send(Message::Text(frame.as_str().into())).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(observer = %id, "observer closed connection");
                        break;
                    }
                    // The channel is receive-only for the relay's purposes;
                    // anything an observer sends is drained and ignored.
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(observer = %id, error = %e, "observer connection failed");
                        break;
                    }
                }
            }
        }
    }

    state.broadcaster.remove(&id).await;
    gauge!(OBSERVERS_ONLINE).set(state.broadcaster.observer_count() as f64);
}
