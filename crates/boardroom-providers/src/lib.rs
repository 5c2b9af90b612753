//! HTTP clients for the external synthesis collaborators.
//!
//! Three clients: chat completion (text replies), speech synthesis (voice
//! audio), and avatar rendering (talking-head video jobs). Each wraps a single
//! upstream wire contract, translates every failure into a `ProviderError`
//! value, and carries its own bounded timeout. Credentials are optional at
//! construction: a missing credential degrades the client to always-fail
//! instead of aborting startup.

pub mod avatar;
pub mod completion;
pub mod error;
pub mod speech;

pub use avatar::{
    wait_with, AvatarClient, AvatarConfig, AvatarScript, JobStatus, WaitOutcome,
    DEFAULT_AVATAR_BASE_URL, DEFAULT_POLL_INTERVAL, DEFAULT_WAIT_BUDGET, VIDEO_WAIT_BUDGET,
};
pub use completion::{
    fallback_reply, CompletionClient, CompletionConfig, DEFAULT_COMPLETION_BASE_URL,
    DEFAULT_COMPLETION_MODEL,
};
pub use error::ProviderError;
pub use speech::{
    SpeechClient, SpeechConfig, VoiceSummary, DEFAULT_SPEECH_BASE_URL, DEFAULT_SPEECH_MODEL,
};
