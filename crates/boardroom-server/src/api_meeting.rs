//! Meeting lifecycle, roster, and synthesis API handlers.
//!
//! Provides:
//! - `POST /api/meeting/start`: create or reset a session and get the opening line
//! - `GET /api/agents`: the persona roster
//! - `GET /api/voices`: upstream voice catalog, degrading to empty
//! - `POST /api/avatar`: on-demand avatar video rendering

use crate::api::ApiError;
use crate::AppState;
use axum::{extract::Extension, Json};
use boardroom_providers::{AvatarScript, VoiceSummary, WaitOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Request body for `POST /api/meeting/start`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMeetingRequest {
    pub session_id: String,
    pub participant_name: String,
    pub topic: String,
}

/// The opening agent message, camelCase like the WebSocket frames.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningMessage {
    pub from: String,
    pub from_name: String,
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Response body for `POST /api/meeting/start`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartMeetingResponse {
    pub session_id: String,
    pub opening_message: OpeningMessage,
    /// Roster agent ids, in registration order.
    pub agents: Vec<String>,
}

/// Handler for `POST /api/meeting/start`.
///
/// Reusing a live session id resets that session to a fresh transcript.
pub async fn start_meeting_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<StartMeetingRequest>,
) -> Result<Json<StartMeetingResponse>, ApiError> {
    let session_id = request.session_id.trim();
    let participant_name = request.participant_name.trim();
    let topic = request.topic.trim();
    if session_id.is_empty() || participant_name.is_empty() || topic.is_empty() {
        return Err(ApiError::BadRequest(
            "sessionId, participantName and topic must be non-empty".to_string(),
        ));
    }

    let opening = state
        .orchestrator
        .open_meeting(session_id, participant_name, topic)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(StartMeetingResponse {
        session_id: session_id.to_string(),
        opening_message: OpeningMessage {
            from: opening.agent_id,
            from_name: opening.agent_name,
            role: opening.role,
            content: opening.content,
            timestamp: opening.timestamp,
        },
        agents: state.registry.list().iter().map(|p| p.id.clone()).collect(),
    }))
}

/// One roster entry as exposed over the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub id: String,
    pub display_name: String,
    pub role: String,
    pub voice_identity: String,
}

/// Response wrapper for the roster listing.
#[derive(Debug, Serialize)]
pub struct AgentsResponse {
    pub agents: Vec<AgentSummary>,
    pub count: usize,
}

/// Handler for `GET /api/agents`.
pub async fn list_agents_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<AgentsResponse> {
    let agents: Vec<AgentSummary> = state
        .registry
        .list()
        .iter()
        .map(|p| AgentSummary {
            id: p.id.clone(),
            display_name: p.display_name.clone(),
            role: p.role.clone(),
            voice_identity: p.voice_identity.clone(),
        })
        .collect();
    let count = agents.len();
    Json(AgentsResponse { agents, count })
}

/// Response wrapper for the voice catalog.
#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceSummary>,
}

/// Handler for `GET /api/voices`.
///
/// The catalog is a convenience for frontend pickers. A missing credential or
/// upstream failure degrades to an empty list rather than an error.
pub async fn list_voices_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Json<VoicesResponse> {
    let voices = match state.speech.list_voices().await {
        Ok(voices) => voices,
        Err(error) => {
            tracing::warn!(%error, "voice catalog unavailable, returning empty list");
            Vec::new()
        }
    };
    Json(VoicesResponse { voices })
}

/// Request body for `POST /api/avatar`. Exactly one of `text` or `audioUrl`
/// drives the render; `text` wins when both are present.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarRequest {
    pub agent_id: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
}

/// Response body for `POST /api/avatar`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarResponse {
    pub video_url: String,
}

/// Handler for `POST /api/avatar`.
///
/// Runs the avatar job to a terminal outcome within the video wait budget.
pub async fn render_avatar_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(request): Json<AvatarRequest>,
) -> Result<Json<AvatarResponse>, ApiError> {
    let persona = state
        .registry
        .get(&request.agent_id)
        .map_err(|e| ApiError::NotFound(e.to_string()))?;

    let script = match (&request.text, &request.audio_url) {
        (Some(text), _) if !text.trim().is_empty() => AvatarScript::Text {
            text,
            voice_identity: &persona.voice_identity,
        },
        (_, Some(audio_url)) if !audio_url.trim().is_empty() => {
            AvatarScript::Audio { audio_url }
        }
        _ => {
            return Err(ApiError::BadRequest(
                "either text or audioUrl is required".to_string(),
            ))
        }
    };

    let job_id = state
        .avatar
        .create_job(&persona.avatar_image_url, script)
        .await
        .map_err(|e| ApiError::BadGateway(format!("avatar job creation failed: {e}")))?;

    tracing::info!(agent = %persona.id, job_id = %job_id, "avatar render job created");

    match state.avatar.wait_for_completion(&job_id).await {
        WaitOutcome::Completed(video_url) => Ok(Json(AvatarResponse { video_url })),
        WaitOutcome::Failed(reason) => Err(ApiError::BadGateway(format!(
            "avatar rendering failed: {reason}"
        ))),
        WaitOutcome::TimedOut => Err(ApiError::GatewayTimeout(
            "avatar rendering did not finish within the wait budget".to_string(),
        )),
    }
}
