//! Bot configuration.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Environment variable holding the bot token.
pub const TOKEN_ENV: &str = "STRICTLY_RPS_TOKEN";

/// Runtime configuration for the bot.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct BotConfig {
    /// Telegram bot token.
    #[serde(default)]
    token: Option<String>,

    /// Bot API base URL.
    #[serde(default = "default_api_url")]
    api_url: String,

    /// File holding the private chat directory.
    #[serde(default = "default_chats_file")]
    chats_file: PathBuf,

    /// Seconds between directory snapshots.
    #[serde(default = "default_save_interval_secs")]
    save_interval_secs: u64,

    /// Long-poll timeout for inbound updates, in seconds.
    #[serde(default = "default_poll_timeout_secs")]
    poll_timeout_secs: u64,

    /// Seconds to wait for a move before giving up; unset waits forever.
    #[serde(default)]
    move_timeout_secs: Option<u64>,

    /// Seconds a group game stays open for joining; unset waits forever.
    #[serde(default)]
    recruit_timeout_secs: Option<u64>,
}

#[instrument]
fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

#[instrument]
fn default_chats_file() -> PathBuf {
    PathBuf::from("chats.json")
}

#[instrument]
fn default_save_interval_secs() -> u64 {
    600
}

#[instrument]
fn default_poll_timeout_secs() -> u64 {
    30
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
            chats_file: default_chats_file(),
            save_interval_secs: default_save_interval_secs(),
            poll_timeout_secs: default_poll_timeout_secs(),
            move_timeout_secs: None,
            recruit_timeout_secs: None,
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Bot token.
    pub token: Option<String>,
    /// Directory file.
    pub chats_file: Option<PathBuf>,
    /// Snapshot interval in seconds.
    pub save_interval_secs: Option<u64>,
    /// Move timeout in seconds.
    pub move_timeout_secs: Option<u64>,
    /// Recruiting timeout in seconds.
    pub recruit_timeout_secs: Option<u64>,
}

impl BotConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from TOML text.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        info!(chats_file = %config.chats_file.display(), "Config loaded successfully");
        Ok(config)
    }

    /// Applies command-line overrides, then the token from the environment
    /// if none was given.
    #[instrument(skip(self, overrides))]
    pub fn apply(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(token) = overrides.token {
            self.token = Some(token);
        }
        if self.token.is_none() {
            self.token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());
        }
        if let Some(path) = overrides.chats_file {
            self.chats_file = path;
        }
        if let Some(secs) = overrides.save_interval_secs {
            self.save_interval_secs = secs;
        }
        if overrides.move_timeout_secs.is_some() {
            self.move_timeout_secs = overrides.move_timeout_secs;
        }
        if overrides.recruit_timeout_secs.is_some() {
            self.recruit_timeout_secs = overrides.recruit_timeout_secs;
        }
        self.validate()?;
        Ok(self)
    }

    /// Rejects zero intervals and timeouts.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.save_interval_secs == 0 {
            return Err(ConfigError::new("save_interval_secs must be positive".to_string()));
        }
        if self.poll_timeout_secs == 0 {
            return Err(ConfigError::new("poll_timeout_secs must be positive".to_string()));
        }
        if self.move_timeout_secs == Some(0) {
            return Err(ConfigError::new("move_timeout_secs must be positive".to_string()));
        }
        if self.recruit_timeout_secs == Some(0) {
            return Err(ConfigError::new("recruit_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    /// Returns the token or an error if none is configured.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or_else(|| {
            ConfigError::new(format!("No bot token: pass --token or set {}", TOKEN_ENV))
        })
    }

    /// Snapshot interval.
    pub fn save_interval(&self) -> Duration {
        Duration::from_secs(self.save_interval_secs)
    }

    /// Long-poll timeout.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    /// Move timeout, if enabled.
    pub fn move_timeout(&self) -> Option<Duration> {
        self.move_timeout_secs.map(Duration::from_secs)
    }

    /// Recruiting timeout, if enabled.
    pub fn recruit_timeout(&self) -> Option<Duration> {
        self.recruit_timeout_secs.map(Duration::from_secs)
    }

    /// Renders the configuration as TOML with the token redacted.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        let mut shown = self.clone();
        if shown.token.is_some() {
            shown.token = Some("<redacted>".to_string());
        }
        toml::to_string(&shown)
            .map_err(|e| ConfigError::new(format!("Failed to render config: {}", e)))
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
