//! Prompt composition from persona, meeting context, and history.
//!
//! The composer owns the fixed system template and the bounded quoting of
//! conversation history: at most `history_limit` trailing turns, each capped
//! at `turn_char_limit` characters. Missing history yields an empty block,
//! never an error.

use boardroom_types::{AgentPersona, Turn};

/// Company name interpolated into the persona line by default.
pub const DEFAULT_COMPANY: &str = "Sentient Sphere Technologies";

/// Default number of trailing history turns quoted in a prompt.
pub const DEFAULT_HISTORY_LIMIT: usize = 6;

/// Default per-turn character cap applied before quoting.
pub const DEFAULT_TURN_CHAR_LIMIT: usize = 150;

/// A composed system/user prompt pair ready for the completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Builds bounded-context prompts from a fixed template.
#[derive(Debug, Clone)]
pub struct PromptComposer {
    company: String,
    history_limit: usize,
    turn_char_limit: usize,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_COMPANY, DEFAULT_HISTORY_LIMIT, DEFAULT_TURN_CHAR_LIMIT)
    }
}

impl PromptComposer {
    pub fn new(company: impl Into<String>, history_limit: usize, turn_char_limit: usize) -> Self {
        Self {
            company: company.into(),
            history_limit,
            turn_char_limit,
        }
    }

    /// How many trailing turns this composer reads.
    ///
    /// Callers fetching history for composition only need this many turns.
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// Composes the pair for replying to a participant message.
    pub fn reply(
        &self,
        persona: &AgentPersona,
        topic: &str,
        participant: &str,
        history_tail: &[Turn],
        message: &str,
    ) -> PromptPair {
        PromptPair {
            system: self.system_prompt(persona, topic, participant, history_tail),
            user: format!(
                "{participant} said: \"{message}\"\n\nReply with something relevant that adds value to the discussion."
            ),
        }
    }

    /// Composes the pair that opens a meeting.
    pub fn opening(&self, persona: &AgentPersona, topic: &str, participant: &str) -> PromptPair {
        PromptPair {
            system: self.system_prompt(persona, topic, participant, &[]),
            user: format!(
                "Open the meeting in a professional and warm way. Introduce yourself briefly and invite {participant} to share their ideas about {topic}."
            ),
        }
    }

    fn system_prompt(
        &self,
        persona: &AgentPersona,
        topic: &str,
        participant: &str,
        history_tail: &[Turn],
    ) -> String {
        format!(
            "You are {name}, {role} at {company}.\n\
             \n\
             PERSONALITY AND TONE: {personality}\n\
             \n\
             MEETING CONTEXT:\n\
             - Topic: {topic}\n\
             - Participant: {participant}\n\
             - You are in a professional executive meeting\n\
             \n\
             GUIDELINES:\n\
             - Keep it under 120 words and get to the point\n\
             - Stay professional but approachable\n\
             - Contribute insights specific to your area of expertise\n\
             - Be collaborative and constructive\n\
             - Use data and examples when they help\n\
             - Do not repeat what others have already said{history}",
            name = persona.display_name,
            role = persona.role,
            company = self.company,
            personality = persona.personality,
            topic = topic,
            participant = participant,
            history = self.history_block(history_tail),
        )
    }

    /// Formats the quoted history tail.
    ///
    /// Bounds both dimensions itself: even when handed a longer slice, only
    /// the last `history_limit` turns are quoted, each truncated to
    /// `turn_char_limit` characters.
    fn history_block(&self, history_tail: &[Turn]) -> String {
        if history_tail.is_empty() {
            return String::new();
        }
        let skip = history_tail.len().saturating_sub(self.history_limit);
        let mut block = String::from("\n\nCONVERSATION SO FAR:\n");
        for turn in &history_tail[skip..] {
            block.push_str("- ");
            block.push_str(&turn.speaker_name);
            block.push_str(": ");
            block.push_str(truncate_chars(&turn.content, self.turn_char_limit));
            block.push_str("...\n");
        }
        block
    }
}

/// Truncates to at most `limit` characters without splitting a code point.
fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardroom_types::AgentPersona;

    fn persona() -> AgentPersona {
        crate::AgentRegistry::builtin().get("elara").unwrap().clone()
    }

    fn turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| Turn::user(format!("Speaker{i}"), format!("message {i}")))
            .collect()
    }

    #[test]
    fn system_prompt_interpolates_persona_and_context() {
        let composer = PromptComposer::default();
        let pair = composer.reply(&persona(), "Budget", "Ana", &[], "hello");
        assert!(pair.system.contains("Elara Veyra"));
        assert!(pair.system.contains("CEO & Chief of Staff"));
        assert!(pair.system.contains("Sentient Sphere Technologies"));
        assert!(pair.system.contains("- Topic: Budget"));
        assert!(pair.system.contains("- Participant: Ana"));
    }

    #[test]
    fn reply_user_turn_quotes_the_message() {
        let composer = PromptComposer::default();
        let pair = composer.reply(&persona(), "Budget", "Ana", &[], "can we ship?");
        assert!(pair.user.starts_with("Ana said: \"can we ship?\""));
    }

    #[test]
    fn opening_names_participant_and_topic() {
        let composer = PromptComposer::default();
        let pair = composer.opening(&persona(), "Q3 Planning", "Ana");
        assert!(pair.user.contains("invite Ana"));
        assert!(pair.user.contains("Q3 Planning"));
        assert!(!pair.system.contains("CONVERSATION SO FAR"));
    }

    #[test]
    fn empty_history_yields_no_history_block() {
        let composer = PromptComposer::default();
        let pair = composer.reply(&persona(), "Budget", "Ana", &[], "hello");
        assert!(!pair.system.contains("CONVERSATION SO FAR"));
    }

    #[test]
    fn history_is_capped_at_the_turn_limit() {
        let composer = PromptComposer::default();
        let pair = composer.reply(&persona(), "Budget", "Ana", &turns(10), "hello");
        let quoted = pair.system.matches("\n- Speaker").count();
        assert_eq!(quoted, DEFAULT_HISTORY_LIMIT);
        // Oldest four turns fall off the front.
        assert!(!pair.system.contains("message 3"));
        assert!(pair.system.contains("message 4"));
        assert!(pair.system.contains("message 9"));
    }

    #[test]
    fn long_turns_are_truncated_to_the_character_cap() {
        let composer = PromptComposer::default();
        let long = "x".repeat(400);
        let history = vec![Turn::user("Ana", long)];
        let pair = composer.reply(&persona(), "Budget", "Ana", &history, "hello");
        let expected = "x".repeat(DEFAULT_TURN_CHAR_LIMIT);
        assert!(pair.system.contains(&format!("- Ana: {expected}...")));
        assert!(!pair.system.contains(&"x".repeat(DEFAULT_TURN_CHAR_LIMIT + 1)));
    }

    #[test]
    fn truncation_never_splits_a_code_point() {
        let composer = PromptComposer::default();
        let long = "é".repeat(200);
        let history = vec![Turn::user("Ana", long)];
        let pair = composer.reply(&persona(), "Budget", "Ana", &history, "hello");
        let expected = "é".repeat(DEFAULT_TURN_CHAR_LIMIT);
        assert!(pair.system.contains(&expected));
    }

    #[test]
    fn history_block_quotes_display_names() {
        let composer = PromptComposer::default();
        let history = vec![
            Turn::user("Ana", "what is the plan?"),
            Turn::agent("elara", "Elara Veyra", "let's review the numbers"),
        ];
        let pair = composer.reply(&persona(), "Budget", "Ana", &history, "ok");
        assert!(pair.system.contains("- Ana: what is the plan?..."));
        assert!(pair.system.contains("- Elara Veyra: let's review the numbers..."));
    }
}
