//! Speech synthesis client.
//!
//! Wraps the external text-to-speech service. Synthesis is a best-effort
//! enrichment: failures come back as values for the caller to branch on, and
//! a client without a credential always fails. Output is raw MP3 bytes;
//! transport encoding is the caller's concern.

use crate::error::ProviderError;
use boardroom_types::VoiceSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default speech endpoint base.
pub const DEFAULT_SPEECH_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Default synthesis model.
pub const DEFAULT_SPEECH_MODEL: &str = "eleven_multilingual_v2";

/// Speech client configuration.
#[derive(Clone)]
pub struct SpeechConfig {
    /// Endpoint base; `{base_url}/text-to-speech/{voice}` is called.
    pub base_url: String,
    /// Header credential. `None` degrades the client to always-fail.
    pub api_key: Option<String>,
    pub model_id: String,
    /// Whole-request wall-clock budget.
    pub timeout: Duration,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SPEECH_BASE_URL.to_string(),
            api_key: None,
            model_id: DEFAULT_SPEECH_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("model_id", &self.model_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: &'a VoiceSettings,
}

/// One entry from the upstream voice catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceSummary {
    pub voice_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VoiceCatalog {
    #[serde(default)]
    voices: Vec<VoiceSummary>,
}

/// Client for the external text-to-speech service.
#[derive(Debug, Clone)]
pub struct SpeechClient {
    client: Client,
    config: SpeechConfig,
}

impl SpeechClient {
    pub fn new(config: SpeechConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Synthesizes `text` in a persona voice, returning raw MP3 bytes.
    pub async fn synthesize(
        &self,
        text: &str,
        voice_identity: &str,
        settings: &VoiceSettings,
    ) -> Result<Vec<u8>, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("speech"))?;

        let url = format!("{}/text-to-speech/{}", self.config.base_url, voice_identity);
        let response = self
            .client
            .post(&url)
            .header("xi-api-key", api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&SynthesisRequest {
                text,
                model_id: &self.config.model_id,
                voice_settings: settings,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetches the upstream voice catalog.
    pub async fn list_voices(&self) -> Result<Vec<VoiceSummary>, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("speech"))?;

        let url = format!("{}/voices", self.config.base_url);
        let response = self
            .client
            .get(&url)
            .header("xi-api-key", api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let catalog: VoiceCatalog = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(catalog.voices)
    }
}
