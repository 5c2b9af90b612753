//! The persona roster.
//!
//! Personas are loaded once at startup and never mutated. The roster content
//! is configuration, not logic: any set of personas works as long as each id
//! is unique. `builtin` provides the executive team the platform ships with.

use crate::AgentError;
use boardroom_types::{AgentPersona, VoiceSettings};
use std::collections::HashMap;

/// Immutable persona lookup table preserving registration order.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    personas: Vec<AgentPersona>,
    index: HashMap<String, usize>,
}

impl AgentRegistry {
    /// Builds a registry from an ordered persona list.
    ///
    /// Fails when two personas share an id.
    pub fn new(personas: Vec<AgentPersona>) -> Result<Self, AgentError> {
        let mut index = HashMap::with_capacity(personas.len());
        for (pos, persona) in personas.iter().enumerate() {
            if index.insert(persona.id.clone(), pos).is_some() {
                return Err(AgentError::DuplicateAgent(persona.id.clone()));
            }
        }
        Ok(Self { personas, index })
    }

    /// Looks up a persona by id.
    pub fn get(&self, agent_id: &str) -> Result<&AgentPersona, AgentError> {
        self.index
            .get(agent_id)
            .map(|&pos| &self.personas[pos])
            .ok_or_else(|| AgentError::UnknownAgent(agent_id.to_string()))
    }

    /// Returns true when a persona is registered under the id.
    pub fn contains(&self, agent_id: &str) -> bool {
        self.index.contains_key(agent_id)
    }

    /// All personas in registration order.
    pub fn list(&self) -> &[AgentPersona] {
        &self.personas
    }

    /// Number of registered personas.
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Returns true when no persona is registered.
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    /// The built-in executive roster.
    ///
    /// Ids are stable wire identifiers; voice identities and avatar images are
    /// opaque references into the external synthesis services.
    pub fn builtin() -> Self {
        let personas = vec![
            persona(
                "elara",
                "Elara Veyra",
                "CEO & Chief of Staff",
                "Strategic, decisive, visionary leader. Leads with empathy and data. \
                 Executive, inspiring tone.",
                "XrExE9yKIg1WjnnlVkGX",
                VoiceSettings {
                    stability: 0.6,
                    similarity_boost: 0.8,
                    style: 0.3,
                    use_speaker_boost: true,
                },
                "https://create-images-results.d-id.com/google-oauth2%7C117862926490962374265/upl_YMhbDRIYTNPbhOLcTCvqT/image.jpeg",
            ),
            persona(
                "aurora",
                "Aurora Castellane",
                "Chief Marketing Officer",
                "Creative, analytical, results-oriented. Strong on storytelling and \
                 growth. Engaging, persuasive tone.",
                "FGY2WhTYpPnrIDTdsKH5",
                VoiceSettings {
                    stability: 0.5,
                    similarity_boost: 0.75,
                    style: 0.4,
                    use_speaker_boost: true,
                },
                "https://create-images-results.d-id.com/DefaultPresenters/Noelle_f/image.jpeg",
            ),
            persona(
                "helios",
                "Helios Vanterre",
                "Chief Design Officer",
                "Visionary, perfectionist, innovative. Obsessive about detail and \
                 aesthetics. Inspiring, creative tone.",
                "2EiwWnXFnvU5JabPnv8n",
                VoiceSettings {
                    stability: 0.7,
                    similarity_boost: 0.7,
                    style: 0.2,
                    use_speaker_boost: true,
                },
                "https://create-images-results.d-id.com/DefaultPresenters/Eric_f/image.jpeg",
            ),
            persona(
                "hephaestus",
                "Hephaestus Forge",
                "Chief Technology Officer",
                "Pragmatic, technical, problem-solver. Architects robust, scalable \
                 systems. Analytical, precise tone.",
                "CwhRBWXzGAHq8TQ4Fs17",
                VoiceSettings {
                    stability: 0.8,
                    similarity_boost: 0.6,
                    style: 0.1,
                    use_speaker_boost: true,
                },
                "https://create-images-results.d-id.com/DefaultPresenters/James_f/image.jpeg",
            ),
            persona(
                "athena",
                "Athena Sophros",
                "Chief Knowledge Officer",
                "Analytical, methodical, encyclopedic. Turns data into actionable \
                 insight. Clear, objective tone.",
                "Xb7hH8MSUJpSbSDYk0k2",
                VoiceSettings {
                    stability: 0.7,
                    similarity_boost: 0.75,
                    style: 0.2,
                    use_speaker_boost: true,
                },
                "https://create-images-results.d-id.com/DefaultPresenters/Amy_f/image.jpeg",
            ),
        ];

        // Ids above are distinct literals, so the duplicate check cannot trip.
        let index = personas
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.id.clone(), pos))
            .collect();
        Self { personas, index }
    }
}

fn persona(
    id: &str,
    display_name: &str,
    role: &str,
    personality: &str,
    voice_identity: &str,
    voice: VoiceSettings,
    avatar_image_url: &str,
) -> AgentPersona {
    AgentPersona {
        id: id.to_string(),
        display_name: display_name.to_string(),
        role: role.to_string(),
        personality: personality.to_string(),
        voice_identity: voice_identity.to_string(),
        voice,
        avatar_image_url: avatar_image_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_roster_has_five_personas_in_order() {
        let registry = AgentRegistry::builtin();
        let ids: Vec<&str> = registry.list().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["elara", "aurora", "helios", "hephaestus", "athena"]);
    }

    #[test]
    fn get_unknown_agent_fails() {
        let registry = AgentRegistry::builtin();
        assert!(matches!(
            registry.get("poseidon"),
            Err(AgentError::UnknownAgent(id)) if id == "poseidon"
        ));
    }

    #[test]
    fn get_returns_persona_fields() {
        let registry = AgentRegistry::builtin();
        let aurora = registry.get("aurora").unwrap();
        assert_eq!(aurora.display_name, "Aurora Castellane");
        assert_eq!(aurora.role, "Chief Marketing Officer");
        assert!(!aurora.voice_identity.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut personas = AgentRegistry::builtin().list().to_vec();
        personas.push(personas[0].clone());
        assert!(matches!(
            AgentRegistry::new(personas),
            Err(AgentError::DuplicateAgent(id)) if id == "elara"
        ));
    }
}
