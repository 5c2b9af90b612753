//! Per-message orchestration pipeline.
//!
//! One inbound participant message flows strictly through: record the user
//! turn, select the responding persona, compose the bounded-history prompt,
//! call the completion provider, record the agent turn, best-effort speech
//! synthesis, deliver the frame. Synthesis failure degrades the frame and
//! never blocks text delivery.

use crate::api_ws::{encode_frame, AgentMessagePayload, ConnectionManager, InboundFrame, OutboundFrame};
use crate::session::SessionStore;
use base64::Engine;
use boardroom_agents::{AgentError, AgentRegistry, PromptComposer, RoutingTable};
use boardroom_providers::{CompletionClient, SpeechClient};
use boardroom_types::{AgentPersona, Turn};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// The opening line generated when a meeting starts.
#[derive(Debug, Clone)]
pub struct OpeningReply {
    pub agent_id: String,
    pub agent_name: String,
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Wires the registry, selector, composer, providers, and the shared state
/// maps into the per-message control loop.
pub struct Orchestrator {
    registry: Arc<AgentRegistry>,
    routing: RoutingTable,
    composer: PromptComposer,
    completion: CompletionClient,
    speech: SpeechClient,
    sessions: SessionStore,
    connections: ConnectionManager,
}

impl Orchestrator {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        registry: Arc<AgentRegistry>,
        routing: RoutingTable,
        composer: PromptComposer,
        completion: CompletionClient,
        speech: SpeechClient,
        sessions: SessionStore,
        connections: ConnectionManager,
    ) -> Self {
        Self {
            registry,
            routing,
            composer,
            completion,
            speech,
            sessions,
            connections,
        }
    }

    /// Creates (or resets) a session and generates the default persona's
    /// opening line, recorded as the session's first agent turn. The opening
    /// carries no audio.
    pub async fn open_meeting(
        &self,
        session_id: &str,
        participant_name: &str,
        topic: &str,
    ) -> Result<OpeningReply, AgentError> {
        let replaced = self
            .sessions
            .create(session_id, participant_name, topic)
            .await;
        if replaced {
            tracing::info!(
                session_id,
                "meeting restarted on a live session id, transcript reset"
            );
        }

        let persona = self.registry.get(self.routing.default_agent())?;
        let prompt = self.composer.opening(persona, topic, participant_name);
        let content = self
            .completion
            .complete(&prompt.system, &prompt.user, participant_name)
            .await;

        let turn = Turn::agent(&persona.id, &persona.display_name, &content);
        let timestamp = turn.timestamp;
        self.sessions.append_turn(session_id, turn).await;

        tracing::info!(
            session_id,
            participant = participant_name,
            topic,
            agent = %persona.id,
            "meeting opened"
        );

        Ok(OpeningReply {
            agent_id: persona.id.clone(),
            agent_name: persona.display_name.clone(),
            role: persona.role.clone(),
            content,
            timestamp,
        })
    }

    /// Runs the full pipeline for one inbound participant message.
    ///
    /// An unknown session id produces an error frame and mutates nothing.
    /// The participant always gets a reply frame with non-empty content;
    /// only the audio enrichment is allowed to degrade.
    pub async fn handle_inbound(&self, session_id: &str, frame: InboundFrame) {
        let limit = self.composer.history_limit();

        // Existence check and speaker resolution before any mutation.
        let participant = match self.sessions.compose_view(session_id, 0).await {
            Some(view) => frame.user_name.unwrap_or(view.participant_name),
            None => {
                tracing::warn!(session_id, "message for unknown session");
                self.send_error(
                    session_id,
                    "Session not found. Start a meeting before sending messages.",
                )
                .await;
                return;
            }
        };

        self.sessions
            .append_turn(session_id, Turn::user(participant.clone(), frame.content.clone()))
            .await;

        // The view is re-read after the append so the tail includes the
        // message being answered.
        let view = match self.sessions.compose_view(session_id, limit).await {
            Some(view) => view,
            None => {
                // Evicted between append and read; the peer is gone.
                tracing::debug!(session_id, "session evicted mid-pipeline, dropping reply");
                return;
            }
        };

        let agent_id = self.routing.select(&frame.content);
        let persona = match self.registry.get(agent_id) {
            Ok(persona) => persona,
            Err(error) => {
                tracing::error!(session_id, agent_id, %error, "routed to unknown persona");
                self.send_error(session_id, "Internal routing error.").await;
                return;
            }
        };

        let prompt = self
            .composer
            .reply(persona, &view.topic, &participant, &view.tail, &frame.content);
        let content = self
            .completion
            .complete(&prompt.system, &prompt.user, &participant)
            .await;

        let turn = Turn::agent(&persona.id, &persona.display_name, &content);
        let timestamp = turn.timestamp;
        self.sessions.append_turn(session_id, turn).await;

        let audio = self.synthesize_speech(persona, &content).await;

        let payload = AgentMessagePayload {
            from: persona.id.clone(),
            from_name: persona.display_name.clone(),
            role: persona.role.clone(),
            content,
            timestamp,
            voice_identity: persona.voice_identity.clone(),
            audio,
        };
        if let Some(json) = encode_frame(&OutboundFrame::AgentMessage(payload)) {
            self.connections.send(session_id, json).await;
        }
    }

    /// Best-effort speech synthesis. Failure is logged and degrades the
    /// frame to text-only.
    async fn synthesize_speech(&self, persona: &AgentPersona, text: &str) -> Option<String> {
        match self
            .speech
            .synthesize(text, &persona.voice_identity, &persona.voice)
            .await
        {
            Ok(bytes) => Some(base64::engine::general_purpose::STANDARD.encode(bytes)),
            Err(error) => {
                tracing::warn!(
                    agent = %persona.id,
                    %error,
                    "speech synthesis failed, delivering text only"
                );
                None
            }
        }
    }

    async fn send_error(&self, session_id: &str, content: &str) {
        if let Some(json) = encode_frame(&OutboundFrame::Error {
            content: content.to_string(),
        }) {
            self.connections.send(session_id, json).await;
        }
    }
}
