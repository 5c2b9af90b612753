//! Shared HTTP surface: the API error type and the service info handler.

use crate::AppState;
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by the HTTP handlers.
///
/// Rendered as `{"error": message}` JSON with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// An upstream provider rejected or failed the request.
    #[error("{0}")]
    BadGateway(String),

    /// An upstream provider did not finish within the wait budget.
    #[error("{0}")]
    GatewayTimeout(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Handler for `GET /`. Service info for dashboards and smoke checks.
pub async fn info_handler(Extension(state): Extension<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "service": "boardroom",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "operational",
        "agents": state.registry.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn api_error_renders_json_with_matching_status() {
        let response = ApiError::NotFound("unknown agent: zeus".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json: Value = serde_json::from_slice(&body).expect("json body");
        assert_eq!(json["error"], "unknown agent: zeus");
    }

    #[tokio::test]
    async fn timeout_maps_to_gateway_timeout() {
        let response = ApiError::GatewayTimeout("render budget exhausted".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
