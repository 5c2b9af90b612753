//! Agent persona definitions.
//!
//! A persona is an immutable responder profile: identity, role, personality
//! sketch, and the opaque references the synthesis services need. Personas are
//! loaded once at startup and shared read-only by every session.

use serde::{Deserialize, Serialize};

/// Tuning parameters for a persona's synthesized voice.
///
/// Serialized verbatim into the speech service request body, so field names
/// follow that service's contract.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    /// Voice stability (0-1). Lower values sound more expressive.
    pub stability: f32,
    /// Similarity to the reference voice (0-1).
    pub similarity_boost: f32,
    /// Style exaggeration (0-1).
    pub style: f32,
    /// Clarity enhancement flag.
    pub use_speaker_boost: bool,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
        }
    }
}

/// An immutable AI responder profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentPersona {
    /// Unique key used for routing and wire frames.
    pub id: String,
    /// Full display name quoted in prompts and outbound frames.
    pub display_name: String,
    /// Executive role title.
    pub role: String,
    /// Free-text personality sketch interpolated verbatim into prompts.
    pub personality: String,
    /// Opaque reference to the external speech service voice.
    pub voice_identity: String,
    /// Synthesis tuning for this persona's voice.
    pub voice: VoiceSettings,
    /// Opaque reference to the avatar source image.
    pub avatar_image_url: String,
}
