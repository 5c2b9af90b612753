//! Server configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server network settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Meeting composition settings.
    #[serde(default)]
    pub meeting: MeetingConfig,

    /// Session lifecycle settings.
    #[serde(default)]
    pub sessions: SessionsConfig,

    /// Chat completion provider settings.
    #[serde(default)]
    pub completion: CompletionProviderConfig,

    /// Speech synthesis provider settings.
    #[serde(default)]
    pub speech: SpeechProviderConfig,

    /// Avatar rendering provider settings.
    #[serde(default)]
    pub avatar: AvatarProviderConfig,
}

/// Network configuration for the HTTP server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "boardroom_server=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

/// Prompt composition configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingConfig {
    /// Company name interpolated into every system prompt.
    #[serde(default = "default_company")]
    pub company: String,

    /// How many trailing turns of history are read at composition time.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Per-turn character cap applied to history lines.
    #[serde(default = "default_turn_char_limit")]
    pub turn_char_limit: usize,
}

/// Session lifecycle configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionsConfig {
    /// Seconds of inactivity after which a session without a live connection
    /// is pruned. Zero disables pruning.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

/// Chat completion provider configuration. The credential comes from
/// `OPENAI_API_KEY`, never from this file.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionProviderConfig {
    /// Endpoint base URL.
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_completion_model")]
    pub model: String,
}

/// Speech synthesis provider configuration. The credential comes from
/// `ELEVENLABS_API_KEY`, never from this file.
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechProviderConfig {
    /// Endpoint base URL.
    #[serde(default = "default_speech_base_url")]
    pub base_url: String,

    /// Synthesis model identifier.
    #[serde(default = "default_speech_model")]
    pub model: String,
}

/// Avatar rendering provider configuration. The credential comes from
/// `DID_API_KEY`, never from this file.
#[derive(Debug, Clone, Deserialize)]
pub struct AvatarProviderConfig {
    /// Endpoint base URL.
    #[serde(default = "default_avatar_base_url")]
    pub base_url: String,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_company() -> String {
    boardroom_agents::DEFAULT_COMPANY.to_string()
}

fn default_history_limit() -> usize {
    boardroom_agents::DEFAULT_HISTORY_LIMIT
}

fn default_turn_char_limit() -> usize {
    boardroom_agents::DEFAULT_TURN_CHAR_LIMIT
}

fn default_idle_timeout_secs() -> u64 {
    3600
}

fn default_completion_base_url() -> String {
    boardroom_providers::DEFAULT_COMPLETION_BASE_URL.to_string()
}

fn default_completion_model() -> String {
    boardroom_providers::DEFAULT_COMPLETION_MODEL.to_string()
}

fn default_speech_base_url() -> String {
    boardroom_providers::DEFAULT_SPEECH_BASE_URL.to_string()
}

fn default_speech_model() -> String {
    boardroom_providers::DEFAULT_SPEECH_MODEL.to_string()
}

fn default_avatar_base_url() -> String {
    boardroom_providers::DEFAULT_AVATAR_BASE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for MeetingConfig {
    fn default() -> Self {
        Self {
            company: default_company(),
            history_limit: default_history_limit(),
            turn_char_limit: default_turn_char_limit(),
        }
    }
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}

impl Default for CompletionProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            model: default_completion_model(),
        }
    }
}

impl Default for SpeechProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_speech_base_url(),
            model: default_speech_model(),
        }
    }
}

impl Default for AvatarProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_avatar_base_url(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `BOARDROOM_HOST` overrides `server.host`
/// - `BOARDROOM_PORT` overrides `server.port`
/// - `BOARDROOM_LOG_LEVEL` overrides `logging.level`
/// - `BOARDROOM_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("BOARDROOM_HOST") {
        if let Ok(parsed) = host.parse() {
            config.server.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("BOARDROOM_PORT") {
        if let Ok(parsed) = port.parse() {
            config.server.port = parsed;
        }
    }
    if let Ok(level) = std::env::var("BOARDROOM_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("BOARDROOM_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = load_config(Some("/nonexistent/boardroom.toml"))
            .expect("missing file should not be an error");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.meeting.history_limit, 6);
        assert_eq!(config.sessions.idle_timeout_secs, 3600);
        assert_eq!(config.completion.model, "gpt-4.1-mini");
    }

    #[test]
    fn partial_file_keeps_defaults_for_absent_sections() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[server]\nport = 8080\n\n[meeting]\nhistory_limit = 10\n"
        )
        .expect("write config");

        let config =
            load_config(Some(file.path().to_str().expect("utf8 path"))).expect("load config");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.meeting.history_limit, 10);
        // Untouched sections keep their defaults.
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.speech.model, "eleven_multilingual_v2");
        assert_eq!(config.avatar.base_url, "https://api.d-id.com");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[server\nport = oops").expect("write config");

        let err = load_config(Some(file.path().to_str().expect("utf8 path")))
            .expect_err("expected a parse error");
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
