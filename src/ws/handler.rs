use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};

use crate::state::AppState;
use crate::workers::aggregator::StateAggregator;
use crate::ws::registry::ConnectionRegistry;

/// Upgrades the request and attaches the socket to the broadcast channel.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drives one connection: bootstrap and registration, a writer task fed by
/// the registry, and a read loop dispatching client commands.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    let registry = state.broadcaster.registry().clone();

    let bootstrap: Vec<Message> = state
        .aggregator
        .bootstrap()
        .await
        .iter()
        .filter_map(|msg| msg.to_text().ok())
        .map(Message::Text)
        .collect();

    let mut rx = registry.register(conn_id.clone(), bootstrap).await;
    tracing::info!(conn_id = %conn_id, "WebSocket connected");

    let downloads_task = tokio::spawn(send_downloads_slice(
        state.aggregator.clone(),
        registry.clone(),
        conn_id.clone(),
    ));

    let (mut sink, mut stream) = socket.split();

    let writer_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let closing = matches!(msg, Message::Close(_));
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %writer_conn_id, "WebSocket sink closed");
                break;
            }
            if closing {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if let Some(reply) = state.commands.dispatch(text.as_str()).await {
                    match reply.to_text() {
                        Ok(body) => {
                            registry.send_to(&conn_id, Message::Text(body)).await;
                        }
                        Err(e) => {
                            tracing::error!(conn_id = %conn_id, "Failed to serialize reply: {}", e)
                        }
                    }
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    registry.remove(&conn_id).await;
    downloads_task.abort();
    send_task.abort();
    tracing::info!(conn_id = %conn_id, "WebSocket disconnected");
}

/// Unicasts the `aria2` slice once the daemon answers.
async fn send_downloads_slice(
    aggregator: StateAggregator,
    registry: Arc<ConnectionRegistry>,
    conn_id: String,
) {
    let Some(slice) = aggregator.downloads_slice().await else {
        return;
    };
    match slice.to_text() {
        Ok(text) => {
            registry.send_to(&conn_id, Message::Text(text)).await;
        }
        Err(e) => tracing::error!(conn_id = %conn_id, "Failed to serialize aria2 slice: {}", e),
    }
}
