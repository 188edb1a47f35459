use std::sync::Arc;

use axum::extract::ws::Message;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::message::{MessageKind, WsMessage};
use super::registry::ConnectionRegistry;

/// Producer side of the broadcast pipeline.
///
/// Snapshots, command-driven events and one-shot notifications all go
/// through the same bounded queue; `publish` waits when it is full.
#[derive(Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    queue: mpsc::Sender<WsMessage>,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<WsMessage>) {
        let (queue, rx) = mpsc::channel(capacity.max(1));
        (Self { registry, queue }, rx)
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Enqueue a message for every connection. Returns false once the
    /// delivery loop is gone.
    pub async fn publish(&self, message: WsMessage) -> bool {
        self.queue.send(message).await.is_ok()
    }

    /// Serialize `data` and publish it under `kind`.
    pub async fn emit<T: Serialize>(&self, kind: MessageKind, data: &T) -> bool {
        match serde_json::to_value(data) {
            Ok(value) => self.publish(WsMessage::new(kind, value)).await,
            Err(e) => {
                tracing::error!(kind = ?kind, "Failed to serialize broadcast payload: {}", e);
                false
            }
        }
    }

    pub fn spawn_delivery(&self, rx: mpsc::Receiver<WsMessage>) -> JoinHandle<()> {
        tokio::spawn(run_delivery(self.registry.clone(), rx))
    }
}

/// Drains the queue until every producer is dropped, serializing each
/// message once and fanning it out.
pub async fn run_delivery(registry: Arc<ConnectionRegistry>, mut rx: mpsc::Receiver<WsMessage>) {
    tracing::info!("🚀 Broadcast delivery loop started");
    while let Some(message) = rx.recv().await {
        let text = match message.to_text() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(kind = ?message.kind, "Failed to serialize message: {}", e);
                continue;
            }
        };
        let delivered = registry.fan_out(Message::Text(text)).await;
        tracing::trace!(kind = ?message.kind, delivered, "Broadcast delivered");
    }
    tracing::info!("Broadcast delivery loop stopped");
}
