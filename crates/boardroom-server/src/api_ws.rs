//! WebSocket API handler and connection management.

use crate::AppState;
use axum::{
    extract::{
        ws::{Message as AxumMessage, WebSocket},
        ConnectInfo, Extension, Path, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    net::SocketAddr,
    sync::Arc,
};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Incoming WebSocket frame from the participant.
#[derive(Debug, Deserialize)]
pub struct InboundFrame {
    /// The participant's message text.
    pub content: String,
    /// Optional display name override; falls back to the session's
    /// participant name.
    #[serde(rename = "userName")]
    pub user_name: Option<String>,
}

/// Payload of an agent reply frame, camelCase on the wire.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessagePayload {
    /// Responding agent id.
    pub from: String,
    /// Responding agent display name.
    pub from_name: String,
    /// Responding agent role title.
    pub role: String,
    /// Reply text.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Voice reference clients can use for their own playback decisions.
    pub voice_identity: String,
    /// Base64 MP3 audio. Absent (not null) when synthesis degraded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

/// Outgoing WebSocket frame wrapper.
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum OutboundFrame {
    #[serde(rename = "agent_message")]
    AgentMessage(AgentMessagePayload),
    #[serde(rename = "error")]
    Error { content: String },
}

/// Serializes an outbound frame, logging instead of propagating on failure.
pub(crate) fn encode_frame(frame: &OutboundFrame) -> Option<String> {
    match serde_json::to_string(frame) {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("failed to serialize outbound frame: {}", e);
            None
        }
    }
}

/// Type alias for the connection map to satisfy clippy complexity checks.
type ConnectionMap = HashMap<String, (Uuid, mpsc::Sender<String>)>;

/// Manages the live WebSocket connection per session id.
///
/// The manager owns the only long-lived sender handle for each connection, so
/// replacing a map entry closes the superseded connection's channel once its
/// queue drains.
#[derive(Clone, Default)]
pub struct ConnectionManager {
    /// Live connections: session id -> (connection_id, sender).
    connections: Arc<RwLock<ConnectionMap>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a connection for a session id.
    ///
    /// If the id already has a connection, the old peer is sent one final
    /// error frame announcing the supersession and its sender is dropped,
    /// which closes its channel.
    ///
    /// Returns the unique connection ID.
    pub async fn register(&self, session_id: String, sender: mpsc::Sender<String>) -> Uuid {
        let connection_id = Uuid::new_v4();

        let replaced = {
            let mut connections = self.connections.write().await;
            connections.insert(session_id.clone(), (connection_id, sender))
        };

        if let Some((old_id, old_sender)) = replaced {
            if let Some(notice) = encode_frame(&OutboundFrame::Error {
                content: "Connection superseded by a newer connection for this session."
                    .to_string(),
            }) {
                let _ = old_sender.try_send(notice);
            }
            tracing::info!(
                session_id = %session_id,
                old_connection_id = %old_id,
                "replaced existing WebSocket connection"
            );
        }

        connection_id
    }

    /// Removes a connection if the connection ID still matches.
    ///
    /// Returns `true` when this call removed the entry, `false` for stale or
    /// repeated removal requests. A superseded connection's teardown can
    /// therefore never evict its replacement.
    pub async fn unregister(&self, session_id: &str, connection_id: Uuid) -> bool {
        let mut connections = self.connections.write().await;
        match connections.get(session_id) {
            Some((current_id, _)) if *current_id == connection_id => {
                connections.remove(session_id);
                true
            }
            _ => false,
        }
    }

    /// Sends a frame string to the session's live connection.
    ///
    /// A session without a connection is a no-op, not an error: replies for a
    /// departed peer are dropped here.
    pub async fn send(&self, session_id: &str, frame_json: String) {
        let connections = self.connections.read().await;
        if let Some((_, sender)) = connections.get(session_id) {
            if let Err(e) = sender.try_send(frame_json) {
                tracing::warn!(
                    session_id = %session_id,
                    "dropping outbound frame for slow consumer: {}",
                    e
                );
            }
        }
    }

    /// Session ids with a live connection. Used by the pruning task.
    pub async fn live_sessions(&self) -> HashSet<String> {
        self.connections.read().await.keys().cloned().collect()
    }

    pub async fn is_connected(&self, session_id: &str) -> bool {
        self.connections.read().await.contains_key(session_id)
    }
}

/// WebSocket handler: `GET /ws/{sessionId}`.
///
/// The upgrade is always accepted; an unknown session id is reported per
/// message with an error frame so the client sees why nothing answers.
pub async fn ws_handler(
    Extension(state): Extension<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    tracing::info!(
        session_id = %session_id,
        remote_addr = %addr,
        "websocket connection request"
    );
    ws.on_upgrade(move |socket| handle_socket(socket, state, session_id))
}

/// Handles the WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, session_id: String) {
    let (mut sender, mut receiver) = socket.split();

    // Bounded channel per connection so a slow consumer drops frames instead
    // of growing memory. 256 is ample for one participant's reply stream.
    let (tx, mut rx) = mpsc::channel::<String>(256);

    let connection_id = state
        .connection_manager
        .register(session_id.clone(), tx)
        .await;

    // Forward task: drains the channel into the socket. Ends when the channel
    // closes, which is how supersession tears this connection down.
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(AxumMessage::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    // Receive task: each inbound message is processed to completion,
    // including downstream synthesis, before the next is read. Outbound order
    // therefore matches inbound order within the session.
    let recv_state = state.clone();
    let recv_session = session_id.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                AxumMessage::Text(text) => {
                    match serde_json::from_str::<InboundFrame>(&text.to_string()) {
                        Ok(frame) => {
                            recv_state
                                .orchestrator
                                .handle_inbound(&recv_session, frame)
                                .await;
                        }
                        Err(e) => {
                            tracing::warn!(
                                session_id = %recv_session,
                                "failed to parse incoming WebSocket frame: {}",
                                e
                            );
                            if let Some(json) = encode_frame(&OutboundFrame::Error {
                                content: "invalid message format".to_string(),
                            }) {
                                recv_state.connection_manager.send(&recv_session, json).await;
                            }
                        }
                    }
                }
                AxumMessage::Close(_) => break,
                _ => {}
            }
        }
    });

    // Whichever half finishes first takes the other down with it. A
    // superseded connection arrives here through its closed channel and the
    // whole socket is dropped, disconnecting the old peer.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    // Teardown with connection_id check: only the current connection evicts
    // the session. A superseded connection's cleanup is a stale request and
    // leaves the replacement's state alone.
    let was_current = state
        .connection_manager
        .unregister(&session_id, connection_id)
        .await;
    if was_current {
        state.session_store.remove(&session_id).await;
        tracing::info!(session_id = %session_id, "websocket closed, session evicted");
    }
}
