//! Shared types for the Boardroom platform.
//!
//! This crate provides the foundational vocabulary used across all Boardroom
//! crates: the persona profile consumed by routing, prompting, and synthesis,
//! and the conversation turn record kept by the session store.
//!
//! No crate in the workspace depends on anything *except* `boardroom-types`
//! for cross-cutting type definitions. This keeps the dependency graph clean
//! and prevents circular dependencies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerKind {
    /// The human meeting participant.
    User,
    /// One of the AI personas.
    Agent,
}

impl SpeakerKind {
    /// Returns the string label for this speaker kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

/// One atomic contribution appended to a session's conversation history.
///
/// Turns are append-only: history is never edited or reordered. Storage is
/// unbounded; only a bounded tail is read back at prompt-composition time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Whether the participant or a persona spoke.
    pub speaker: SpeakerKind,
    /// Participant name for user turns, persona id for agent turns.
    pub speaker_id: String,
    /// Display label used when the turn is quoted in prompt history.
    pub speaker_name: String,
    /// The spoken text, stored untruncated.
    pub content: String,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Records a participant turn. The participant name doubles as the id.
    pub fn user(name: impl Into<String>, content: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            speaker: SpeakerKind::User,
            speaker_id: name.clone(),
            speaker_name: name,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Records a persona turn.
    pub fn agent(
        id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            speaker: SpeakerKind::Agent,
            speaker_id: id.into(),
            speaker_name: name.into(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

mod persona;
pub use persona::{AgentPersona, VoiceSettings};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speaker_kind_labels() {
        assert_eq!(SpeakerKind::User.label(), "user");
        assert_eq!(SpeakerKind::Agent.label(), "agent");
    }

    #[test]
    fn user_turn_uses_name_as_id() {
        let turn = Turn::user("Ana", "hello");
        assert_eq!(turn.speaker, SpeakerKind::User);
        assert_eq!(turn.speaker_id, "Ana");
        assert_eq!(turn.speaker_name, "Ana");
        assert_eq!(turn.content, "hello");
    }

    #[test]
    fn agent_turn_keeps_id_and_display_name_distinct() {
        let turn = Turn::agent("elara", "Elara Veyra", "welcome");
        assert_eq!(turn.speaker, SpeakerKind::Agent);
        assert_eq!(turn.speaker_id, "elara");
        assert_eq!(turn.speaker_name, "Elara Veyra");
    }
}
