//! RealtimeHub - WebSocket distribution
//!
//! ## Responsibilities
//!
//! - Viewer connection registry
//! - State snapshot broadcasting (every mutation, every engine tick)
//! - Initial snapshot delivery to newly connected viewers
//!
//! Delivery is best-effort per session: each session owns a bounded
//! outbound buffer and a saturated buffer drops that session's payload
//! rather than stalling the broadcaster. State is latest-wins, so the
//! next snapshot restores consistency.

use crate::timer::StatePayload;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Per-session outbound buffer depth. At the ~100ms broadcast cadence this
/// is a few seconds of backlog before a session starts missing updates.
const OUTBOUND_BUFFER: usize = 32;

/// Hub message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum HubMessage {
    State(StatePayload),
}

/// Viewer connection
struct ClientConnection {
    id: Uuid,
    tx: mpsc::Sender<String>,
}

/// RealtimeHub instance
pub struct RealtimeHub {
    connections: RwLock<HashMap<Uuid, ClientConnection>>,
    connection_count: AtomicU64,
}

impl RealtimeHub {
    /// Create new RealtimeHub
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            connection_count: AtomicU64::new(0),
        }
    }

    /// Register a new viewer session
    pub async fn register(&self) -> (Uuid, mpsc::Receiver<String>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);

        let conn = ClientConnection { id, tx };

        {
            let mut connections = self.connections.write().await;
            connections.insert(id, conn);
        }

        self.connection_count.fetch_add(1, Ordering::Relaxed);

        tracing::info!(connection_id = %id, "Viewer connected");

        (id, rx)
    }

    /// Unregister a viewer session
    pub async fn unregister(&self, id: &Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(id).is_some() {
            self.connection_count.fetch_sub(1, Ordering::Relaxed);
            tracing::info!(connection_id = %id, "Viewer disconnected");
        }
    }

    /// Broadcast a message to all viewers
    pub async fn broadcast(&self, message: HubMessage) {
        let json = match serde_json::to_string(&message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message");
                return;
            }
        };

        let connections = self.connections.read().await;
        for conn in connections.values() {
            deliver(conn, json.clone());
        }
    }

    /// Send a message to one viewer (initial snapshot on connect)
    pub async fn send_to(&self, id: &Uuid, message: HubMessage) {
        let json = match serde_json::to_string(&message) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize message");
                return;
            }
        };

        let connections = self.connections.read().await;
        if let Some(conn) = connections.get(id) {
            deliver(conn, json);
        }
    }

    /// Get connection count
    pub fn connection_count(&self) -> u64 {
        self.connection_count.load(Ordering::Relaxed)
    }
}

fn deliver(conn: &ClientConnection, json: String) {
    match conn.tx.try_send(json) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(connection_id = %conn.id, "Outbound buffer full, dropping snapshot");
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            // Transport task is gone; unregister runs when its handler exits.
            tracing::debug!(connection_id = %conn.id, "Send to closed session");
        }
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}
