//! Avatar rendering client.
//!
//! The avatar service is asynchronous: a render job is created, then polled
//! until a terminal status. The wait loop is bounded twice over, by a fixed
//! sleep between polls and by a wall-clock budget. The loop itself takes the
//! poll operation as a closure and runs on the runtime clock, so it can be
//! driven on paused time.

use crate::error::ProviderError;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Default avatar endpoint base.
pub const DEFAULT_AVATAR_BASE_URL: &str = "https://api.d-id.com";

/// Fixed sleep between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wall-clock budget for video rendering waits.
pub const VIDEO_WAIT_BUDGET: Duration = Duration::from_secs(120);

/// General-purpose wait budget.
pub const DEFAULT_WAIT_BUDGET: Duration = Duration::from_secs(60);

/// Avatar client configuration.
#[derive(Clone)]
pub struct AvatarConfig {
    /// Endpoint base; `{base_url}/talks` is called.
    pub base_url: String,
    /// Basic credential. `None` degrades the client to always-fail.
    pub api_key: Option<String>,
    /// Per-request wall-clock budget (job creation and each poll).
    pub timeout: Duration,
    /// Sleep between status polls.
    pub poll_interval: Duration,
    /// Whole-wait wall-clock budget.
    pub wait_budget: Duration,
}

impl Default for AvatarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_AVATAR_BASE_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
            poll_interval: DEFAULT_POLL_INTERVAL,
            wait_budget: VIDEO_WAIT_BUDGET,
        }
    }
}

impl fmt::Debug for AvatarConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("poll_interval", &self.poll_interval)
            .field("wait_budget", &self.wait_budget)
            .finish()
    }
}

/// What the rendered avatar says.
#[derive(Debug, Clone)]
pub enum AvatarScript<'a> {
    /// Provider-synthesized speech from text.
    Text {
        text: &'a str,
        voice_identity: &'a str,
    },
    /// Pre-generated audio by reference.
    Audio { audio_url: &'a str },
}

#[derive(Debug, Serialize)]
struct CreateTalkRequest<'a> {
    source_url: &'a str,
    script: ScriptBody<'a>,
    config: TalkConfig,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum ScriptBody<'a> {
    Text {
        input: &'a str,
        provider: VoiceProvider<'a>,
    },
    Audio {
        audio_url: &'a str,
    },
}

#[derive(Debug, Serialize)]
struct VoiceProvider<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    voice_id: &'a str,
}

#[derive(Debug, Serialize)]
struct TalkConfig {
    fluent: bool,
    pad_audio: f32,
    stitch: bool,
}

#[derive(Debug, Deserialize)]
struct CreateTalkResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct TalkStatusResponse {
    status: String,
    #[serde(default)]
    result_url: Option<String>,
    #[serde(default)]
    error: Option<TalkErrorDetail>,
}

/// Upstream error detail, reported either as a bare string or an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TalkErrorDetail {
    Text(String),
    Object {
        #[serde(default)]
        description: Option<String>,
    },
}

impl TalkErrorDetail {
    fn message(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Object { description } => {
                description.unwrap_or_else(|| "upstream reported failure".to_string())
            }
        }
    }
}

/// Status reported for a render job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Still queued or rendering.
    Pending,
    /// Render finished; the value is the result video URL.
    Done(String),
    /// The upstream rejected or failed the job.
    Failed(String),
}

/// Outcome of a bounded completion wait.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Terminal success; the value is the result video URL.
    Completed(String),
    /// Terminal failure reported by the upstream or the poll itself.
    Failed(String),
    /// The wall-clock budget ran out before a terminal status.
    TimedOut,
}

/// Client for the external avatar rendering service.
#[derive(Debug, Clone)]
pub struct AvatarClient {
    client: Client,
    config: AvatarConfig,
}

impl AvatarClient {
    pub fn new(config: AvatarConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_default();
        Self { client, config }
    }

    /// Submits a render job, returning the upstream job id.
    pub async fn create_job(
        &self,
        source_image_url: &str,
        script: AvatarScript<'_>,
    ) -> Result<String, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("avatar"))?;

        let body = CreateTalkRequest {
            source_url: source_image_url,
            script: match script {
                AvatarScript::Text {
                    text,
                    voice_identity,
                } => ScriptBody::Text {
                    input: text,
                    provider: VoiceProvider {
                        kind: "elevenlabs",
                        voice_id: voice_identity,
                    },
                },
                AvatarScript::Audio { audio_url } => ScriptBody::Audio { audio_url },
            },
            config: TalkConfig {
                fluent: true,
                pad_audio: 0.0,
                stitch: true,
            },
        };

        let url = format!("{}/talks", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {api_key}"))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let created: CreateTalkResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        Ok(created.id)
    }

    /// Reads the current status of a render job.
    pub async fn poll_status(&self, job_id: &str) -> Result<JobStatus, ProviderError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential("avatar"))?;

        let url = format!("{}/talks/{}", self.config.base_url, job_id);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {api_key}"))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status { status, body });
        }

        let parsed: TalkStatusResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        match parsed.status.as_str() {
            "done" => match parsed.result_url {
                Some(result_url) => Ok(JobStatus::Done(result_url)),
                None => Err(ProviderError::Malformed(
                    "done status without result_url".to_string(),
                )),
            },
            "error" | "rejected" => Ok(JobStatus::Failed(
                parsed
                    .error
                    .map(TalkErrorDetail::message)
                    .unwrap_or_else(|| "upstream reported failure".to_string()),
            )),
            _ => Ok(JobStatus::Pending),
        }
    }

    /// Polls a job to a terminal outcome within the configured budget.
    pub async fn wait_for_completion(&self, job_id: &str) -> WaitOutcome {
        wait_with(
            || self.poll_status(job_id),
            self.config.wait_budget,
            self.config.poll_interval,
        )
        .await
    }
}

/// Drives a poll operation to a terminal outcome within `budget`.
///
/// Sleeps `interval` between polls on the runtime clock. A poll error is
/// terminal: the job status cannot recover once a status read breaks.
pub async fn wait_with<F, Fut>(mut poll: F, budget: Duration, interval: Duration) -> WaitOutcome
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<JobStatus, ProviderError>>,
{
    let started = tokio::time::Instant::now();
    loop {
        if started.elapsed() >= budget {
            return WaitOutcome::TimedOut;
        }
        match poll().await {
            Ok(JobStatus::Done(url)) => return WaitOutcome::Completed(url),
            Ok(JobStatus::Failed(reason)) => return WaitOutcome::Failed(reason),
            Ok(JobStatus::Pending) => {}
            Err(error) => return WaitOutcome::Failed(error.to_string()),
        }
        tokio::time::sleep(interval).await;
    }
}
