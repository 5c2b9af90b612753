//! Boardroom server binary, the process entry point.
//!
//! Starts an axum HTTP server with structured logging, provider client
//! wiring, and graceful shutdown on SIGTERM/SIGINT.

use boardroom_agents::{AgentRegistry, PromptComposer, RoutingTable};
use boardroom_providers::{
    AvatarClient, AvatarConfig, CompletionClient, CompletionConfig, SpeechClient, SpeechConfig,
};
use boardroom_server::api_ws::ConnectionManager;
use boardroom_server::config::{self, Config};
use boardroom_server::orchestrator::Orchestrator;
use boardroom_server::session::SessionStore;
use boardroom_server::{app, background, AppState};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("BOARDROOM_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

/// Reads a credential from the environment.
///
/// Absence is logged, never fatal: the dependent client degrades to
/// always-fail and the rest of the server runs normally.
fn env_credential(variable: &'static str, service: &'static str) -> Option<String> {
    match std::env::var(variable) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            tracing::warn!(
                variable,
                service,
                "credential not set, dependent calls will degrade"
            );
            None
        }
    }
}

/// Wires the registry, providers, stores, and orchestrator from config.
fn build_state(config: &Config) -> AppState {
    let registry = Arc::new(AgentRegistry::builtin());
    let routing =
        RoutingTable::builtin(&registry).expect("builtin routing table references a missing agent");
    let composer = PromptComposer::new(
        config.meeting.company.clone(),
        config.meeting.history_limit,
        config.meeting.turn_char_limit,
    );

    let completion = CompletionClient::new(CompletionConfig {
        base_url: config.completion.base_url.clone(),
        api_key: env_credential("OPENAI_API_KEY", "completion"),
        model: config.completion.model.clone(),
        ..CompletionConfig::default()
    });
    let speech = SpeechClient::new(SpeechConfig {
        base_url: config.speech.base_url.clone(),
        api_key: env_credential("ELEVENLABS_API_KEY", "speech"),
        model_id: config.speech.model.clone(),
        ..SpeechConfig::default()
    });
    let avatar = AvatarClient::new(AvatarConfig {
        base_url: config.avatar.base_url.clone(),
        api_key: env_credential("DID_API_KEY", "avatar"),
        ..AvatarConfig::default()
    });

    let session_store = SessionStore::new();
    let connection_manager = ConnectionManager::new();
    let orchestrator = Arc::new(Orchestrator::new(
        registry.clone(),
        routing,
        composer,
        completion,
        speech.clone(),
        session_store.clone(),
        connection_manager.clone(),
    ));

    AppState {
        registry,
        session_store,
        connection_manager,
        orchestrator,
        speech,
        avatar,
    }
}

#[tokio::main]
async fn main() {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    // Load configuration
    let config = config::load_config(selected_config_path)
        .expect("failed to load configuration; the server cannot start without valid config");

    // Initialize tracing
    let filter =
        EnvFilter::try_new(&config.logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if config.logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let state = build_state(&config);
    tracing::info!(agents = state.registry.len(), "loaded persona roster");

    // Background session pruning. The cloned state shares the same stores.
    tokio::spawn(background::start_pruning_task(
        Arc::new(state.clone()),
        config.sessions.idle_timeout_secs,
    ));

    let app = app(state);
    let addr = SocketAddr::new(config.server.host, config.server.port);

    tracing::info!(%addr, "starting boardroom server");

    let listener = TcpListener::bind(addr)
        .await
        .expect("failed to bind to address; is another process using this port?");

    // Serve with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .expect("server error");

    tracing::info!("boardroom server shut down");
}

/// Waits for a SIGINT (Ctrl+C) or SIGTERM signal for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { tracing::info!("received SIGINT, initiating graceful shutdown"); }
        () = terminate => { tracing::info!("received SIGTERM, initiating graceful shutdown"); }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_check_returns_ok() {
        let app = app(build_state(&Config::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
