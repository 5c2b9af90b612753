//! Boardroom server library logic.

pub mod api;
pub mod api_meeting;
pub mod api_ws;
pub mod background;
pub mod config;
pub mod orchestrator;
pub mod session;

use api_ws::ConnectionManager;
use axum::{
    routing::{get, post},
    Extension, Json, Router,
};
use boardroom_agents::AgentRegistry;
use boardroom_providers::{AvatarClient, SpeechClient};
use orchestrator::Orchestrator;
use serde_json::{json, Value};
use session::SessionStore;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The persona roster, shared read-only.
    pub registry: Arc<AgentRegistry>,
    /// In-memory meeting sessions.
    pub session_store: SessionStore,
    /// Live WebSocket connections keyed by session id.
    pub connection_manager: ConnectionManager,
    /// The per-message pipeline.
    pub orchestrator: Arc<Orchestrator>,
    /// Speech client, used directly by the voice catalog endpoint.
    pub speech: SpeechClient,
    /// Avatar client, used directly by the render endpoint.
    pub avatar: AvatarClient,
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::info_handler))
        .route("/health", get(health))
        .route(
            "/api/meeting/start",
            post(api_meeting::start_meeting_handler),
        )
        .route("/api/agents", get(api_meeting::list_agents_handler))
        .route("/api/voices", get(api_meeting::list_voices_handler))
        .route("/api/avatar", post(api_meeting::render_avatar_handler))
        .route("/ws/{sessionId}", get(api_ws::ws_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
