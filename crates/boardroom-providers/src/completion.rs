//! Chat-completion client.
//!
//! One POST to the completion endpoint per reply; no retry, no backoff, no
//! caching. `complete` never fails: any upstream problem yields the fallback
//! apology, with the typed error available through `try_complete`.

use crate::error::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default completion endpoint base.
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model for persona replies.
pub const DEFAULT_COMPLETION_MODEL: &str = "gpt-4.1-mini";

/// Completion client configuration.
///
/// Sampling parameters are fixed at construction; every reply in a process
/// uses the same ones.
#[derive(Clone)]
pub struct CompletionConfig {
    /// Endpoint base; `{base_url}/chat/completions` is called.
    pub base_url: String,
    /// Bearer credential. `None` degrades the client to always-fail.
    pub api_key: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    /// Whole-request wall-clock budget.
    pub timeout: Duration,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_COMPLETION_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_COMPLETION_MODEL.to_string(),
            max_tokens: 250,
            temperature: 0.8,
            presence_penalty: 0.6,
            frequency_penalty: 0.3,
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("presence_penalty", &self.presence_penalty)
            .field("frequency_penalty", &self.frequency_penalty)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    presence_penalty: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for the external chat-completion service.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Generates a reply, substituting the fallback apology on any failure.
    ///
    /// The apology interpolates the participant's name.
    pub async fn complete(&self, system: &str, user: &str, participant_name: &str) -> String {
        match self.try_complete(system, user).await {
            Ok(text) => text,
            Err(error) => {
                tracing::warn!(%error, "completion call failed, substituting fallback reply");
                fallback_reply(participant_name)
            }
        }
    }

    /// Generates a reply or reports the typed failure.
    pub async fn try_complete(&self, system: &str, user: &str) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("completion"))?;

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            presence_penalty: self.config.presence_penalty,
            frequency_penalty: self.config.frequency_penalty,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(ProviderError::Malformed(
                "completion response carried no text".to_string(),
            ));
        }
        Ok(content)
    }
}

/// The designated reply when the completion service is unreachable.
pub fn fallback_reply(participant_name: &str) -> String {
    format!(
        "I'm sorry, {participant_name}, I'm having technical difficulties right now. Could you say that again?"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_reply_names_the_participant() {
        let reply = fallback_reply("Ana");
        assert!(reply.contains("Ana"));
        assert!(reply.contains("technical difficulties"));
    }

    #[test]
    fn debug_output_redacts_the_credential() {
        let config = CompletionConfig {
            api_key: Some("sk-secret".to_string()),
            ..CompletionConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn default_sampling_parameters() {
        let config = CompletionConfig::default();
        assert_eq!(config.model, DEFAULT_COMPLETION_MODEL);
        assert_eq!(config.max_tokens, 250);
        assert_eq!(config.temperature, 0.8);
        assert_eq!(config.presence_penalty, 0.6);
        assert_eq!(config.frequency_penalty, 0.3);
    }
}
