use std::collections::HashMap;

use axum::extract::ws::Message;
use time::OffsetDateTime;
use tokio::sync::{mpsc, RwLock};

/// Outbound buffer per connection. A client that falls this far behind is
/// treated as failed.
pub const OUTBOUND_CAPACITY: usize = 64;

pub type ConnSender = mpsc::Sender<Message>;

struct Connection {
    sender: ConnSender,
    connected_at: OffsetDateTime,
}

/// Live WebSocket connections keyed by connection id.
///
/// Each connection owns a bounded outbound queue drained by its writer task.
/// Fan-out never waits on a connection: a full or closed queue evicts it.
pub struct ConnectionRegistry {
    connections: RwLock<HashMap<String, Connection>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a connection. `bootstrap` is queued on the private channel
    /// before the connection becomes visible to fan-out, so it always
    /// precedes broadcast traffic.
    pub async fn register(
        &self,
        conn_id: String,
        bootstrap: Vec<Message>,
    ) -> mpsc::Receiver<Message> {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY.max(bootstrap.len()));
        for msg in bootstrap {
            // Capacity covers the whole bootstrap and the receiver is alive.
            let _ = tx.try_send(msg);
        }

        let conn = Connection {
            sender: tx,
            connected_at: OffsetDateTime::now_utc(),
        };
        self.connections.write().await.insert(conn_id, conn);
        rx
    }

    pub async fn remove(&self, conn_id: &str) -> bool {
        match self.connections.write().await.remove(conn_id) {
            Some(conn) => {
                let lived = OffsetDateTime::now_utc() - conn.connected_at;
                tracing::debug!(conn_id = %conn_id, seconds = lived.whole_seconds(), "Connection removed");
                true
            }
            None => false,
        }
    }

    /// Queue a message for a single connection. A failed enqueue evicts it.
    pub async fn send_to(&self, conn_id: &str, message: Message) -> bool {
        let delivered = {
            let conns = self.connections.read().await;
            match conns.get(conn_id) {
                Some(conn) => conn.sender.try_send(message).is_ok(),
                None => return false,
            }
        };
        if !delivered {
            self.evict(&[conn_id.to_string()]).await;
        }
        delivered
    }

    /// Queue a message on every live connection and evict the ones that
    /// cannot take it. Returns the number of connections that accepted it.
    pub async fn fan_out(&self, message: Message) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();
        {
            let conns = self.connections.read().await;
            for (id, conn) in conns.iter() {
                match conn.sender.try_send(message.clone()) {
                    Ok(()) => delivered += 1,
                    Err(_) => failed.push(id.clone()),
                }
            }
        }
        if !failed.is_empty() {
            self.evict(&failed).await;
        }
        delivered
    }

    async fn evict(&self, ids: &[String]) {
        let mut conns = self.connections.write().await;
        for id in ids {
            if conns.remove(id).is_some() {
                tracing::warn!(conn_id = %id, "Evicting WebSocket connection after failed write");
            }
        }
    }

    pub async fn contains(&self, conn_id: &str) -> bool {
        self.connections.read().await.contains_key(conn_id)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    /// Send a Close frame to every connection, then clear the map.
    pub async fn shutdown_all(&self) {
        let mut conns = self.connections.write().await;
        let count = conns.len();
        for conn in conns.values() {
            let _ = conn.sender.try_send(Message::Close(None));
        }
        conns.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
