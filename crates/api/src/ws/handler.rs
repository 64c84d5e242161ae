use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;

use postmap_events::ChangeEvent;
use postmap_store::{Document, DocumentStore, StoreError};

use crate::state::AppState;

/// One pushed frame: the change event together with a fresh snapshot of
/// every document in the affected collection.
///
/// Clients replace their in-memory list for the collection wholesale on
/// each frame; there is no diffing against the previous snapshot, so a
/// dropped frame costs nothing once the next one arrives.
#[derive(Debug, Serialize)]
pub struct SnapshotPush {
    #[serde(flatten)]
    pub event: ChangeEvent,
    pub documents: Vec<Document>,
}

/// Build the push frame for one change event by re-reading the affected
/// collection.
pub async fn snapshot_push(
    store: &dyn DocumentStore,
    event: ChangeEvent,
) -> Result<SnapshotPush, StoreError> {
    let documents = store.list(&event.collection).await?;
    Ok(SnapshotPush { event, documents })
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// Each connection holds its own bus subscription; every published
/// [`ChangeEvent`](postmap_events::ChangeEvent) triggers a fresh read of
/// the affected collection, pushed to the client as a JSON text frame.
/// This is how edits made on one device appear on the others without
/// polling.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Subscribes to the change bus.
///   2. Spawns a sender task that turns events into snapshot frames.
///   3. Drains inbound messages on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let mut rx = state.bus.subscribe();
    let (mut sink, mut stream) = socket.split();

    // Sender task: snapshot the affected collection per event and push.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let push = match snapshot_push(state.store.as_ref(), event).await {
                        Ok(push) => push,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to snapshot collection for push");
                            continue;
                        }
                    };
                    let text = match serde_json::to_string(&push) {
                        Ok(text) => text,
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to serialize snapshot push");
                            continue;
                        }
                    };
                    if sink.send(Message::Text(text.into())).await.is_err() {
                        tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    // The client missed frames; each frame carries the
                    // whole collection, so the next one catches it up.
                    tracing::warn!(conn_id = %sender_conn_id, missed, "WebSocket receiver lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Receiver loop: the protocol is push-only, so inbound frames are
    // only drained for close detection.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Close(_)) => break,
            Ok(Message::Pong(_)) => {
                tracing::trace!(conn_id = %conn_id, "Pong received");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}
