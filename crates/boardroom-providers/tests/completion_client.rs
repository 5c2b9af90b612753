//! Integration tests for the completion client against a mock upstream.
//!
//! These tests validate the wire contract (endpoint path, bearer credential,
//! request body) and the fallback behavior: any upstream problem must surface
//! as the apology string, never as an error past `complete`.

use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use boardroom_providers::{fallback_reply, CompletionClient, CompletionConfig, ProviderError};
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpListener;

async fn spawn_upstream(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> CompletionClient {
    CompletionClient::new(CompletionConfig {
        base_url: format!("http://{addr}/v1"),
        api_key: Some("test-key".to_string()),
        ..CompletionConfig::default()
    })
}

#[tokio::test]
async fn test_complete_returns_trimmed_upstream_text() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json(json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "  Let's review the budget.  "}}
                ]
            }))
        }),
    );
    let addr = spawn_upstream(router).await;

    let reply = client_for(addr).complete("system", "user", "Ana").await;
    assert_eq!(reply, "Let's review the budget.");
}

#[tokio::test]
async fn test_request_carries_credential_model_and_both_messages() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|headers: HeaderMap, Json(body): Json<Value>| async move {
            let authorized = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == "Bearer test-key")
                .unwrap_or(false);
            if !authorized {
                return (StatusCode::UNAUTHORIZED, Json(json!({"error": "bad auth"})));
            }
            let model = body["model"].as_str().unwrap_or_default().to_string();
            let roles: Vec<&str> = body["messages"]
                .as_array()
                .map(|msgs| {
                    msgs.iter()
                        .filter_map(|m| m["role"].as_str())
                        .collect()
                })
                .unwrap_or_default();
            if roles != ["system", "user"] {
                return (StatusCode::BAD_REQUEST, Json(json!({"error": "bad roles"})));
            }
            (
                StatusCode::OK,
                Json(json!({
                    "choices": [{"message": {"content": format!("model={model}")}}]
                })),
            )
        }),
    );
    let addr = spawn_upstream(router).await;

    let reply = client_for(addr)
        .try_complete("system prompt", "user prompt")
        .await
        .expect("call should succeed");
    assert_eq!(reply, "model=gpt-4.1-mini");
}

#[tokio::test]
async fn test_upstream_error_yields_fallback() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_upstream(router).await;
    let client = client_for(addr);

    let error = client
        .try_complete("system", "user")
        .await
        .expect_err("expected a status error");
    assert!(matches!(
        error,
        ProviderError::Status { status, .. } if status == StatusCode::INTERNAL_SERVER_ERROR
    ));

    let reply = client.complete("system", "user", "Ana").await;
    assert_eq!(reply, fallback_reply("Ana"));
    assert!(reply.contains("Ana"));
}

#[tokio::test]
async fn test_malformed_body_yields_fallback() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async { Json(json!({"unexpected": true})) }),
    );
    let addr = spawn_upstream(router).await;

    let reply = client_for(addr).complete("system", "user", "Ana").await;
    assert_eq!(reply, fallback_reply("Ana"));
}

#[tokio::test]
async fn test_empty_content_yields_fallback() {
    let router = Router::new().route(
        "/v1/chat/completions",
        post(|| async {
            Json(json!({
                "choices": [{"message": {"role": "assistant", "content": "   "}}]
            }))
        }),
    );
    let addr = spawn_upstream(router).await;

    let reply = client_for(addr).complete("system", "user", "Ana").await;
    assert_eq!(reply, fallback_reply("Ana"));
}

#[tokio::test]
async fn test_missing_credential_yields_fallback_without_upstream() {
    // Port 9 is discard; nothing should ever connect to it.
    let client = CompletionClient::new(CompletionConfig {
        base_url: "http://127.0.0.1:9/v1".to_string(),
        api_key: None,
        ..CompletionConfig::default()
    });

    let error = client
        .try_complete("system", "user")
        .await
        .expect_err("expected a credential error");
    assert!(matches!(error, ProviderError::MissingCredential("completion")));

    let reply = client.complete("system", "user", "Ana").await;
    assert_eq!(reply, fallback_reply("Ana"));
}
