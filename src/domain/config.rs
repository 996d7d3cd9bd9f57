use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::domain::paths;
use crate::strings::messages;

/// Placeholder substituted with the sender's name in the welcome message.
pub const USER_NAME_PLACEHOLDER: &str = "{user_name}";

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    pub relay: RelayConfig,
    #[serde(default)]
    pub system: SystemConfig,
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub homeserver: String,
    pub username: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_env: Option<String>, // e.g. "RELAY_BOT_PASSWORD"
    #[serde(default)]
    pub display_name: Option<String>,
}

/// What the bot relays, where, and what it answers.
#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Room that receives forwarded messages.
    pub channel: String,
    #[serde(default = "default_greeting_command")]
    pub greeting_command: String,
    pub welcome_message: String,
    #[serde(default = "default_fallback_message")]
    pub fallback_message: String,
    pub responses: Vec<String>,
}

/// System-level settings for the bot.
#[derive(Debug, Deserialize, Clone)]
pub struct SystemConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default)]
    pub log_filter: Option<String>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_filter: None,
        }
    }
}

fn default_greeting_command() -> String {
    "/start".to_string()
}

fn default_fallback_message() -> String {
    messages::GENERIC_ERROR.to_string()
}

fn default_data_dir() -> String {
    paths::DATA_DIR.to_string()
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("relay.responses must contain at least one entry")]
    NoResponses,
    #[error("relay.channel must not be empty")]
    NoChannel,
    #[error("relay.greeting_command must not be empty")]
    NoGreetingCommand,
    #[error("services.matrix needs either password or password_env")]
    NoCredential,
    #[error("environment variable {0} is not set")]
    MissingEnv(String),
}

impl AppConfig {
    /// Reads, parses and validates the YAML config at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("{} ({})", messages::CONFIG_READ_ERROR, path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(content).context(messages::CONFIG_PARSE_ERROR)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.relay.responses.is_empty() {
            return Err(ConfigError::NoResponses);
        }
        if self.relay.channel.trim().is_empty() {
            return Err(ConfigError::NoChannel);
        }
        if self.relay.greeting_command.trim().is_empty() {
            return Err(ConfigError::NoGreetingCommand);
        }
        if self.services.matrix.password.is_none() && self.services.matrix.password_env.is_none() {
            return Err(ConfigError::NoCredential);
        }
        Ok(())
    }
}

impl RelayConfig {
    /// Non-fatal configuration problems, reported once logging is up.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if !self.welcome_message.contains(USER_NAME_PLACEHOLDER) {
            warnings.push(messages::WELCOME_WITHOUT_PLACEHOLDER);
        }
        warnings
    }
}

impl MatrixConfig {
    /// Resolves the login password, preferring `password_env` when configured.
    pub fn password(&self) -> Result<String, ConfigError> {
        if let Some(var) = &self.password_env {
            return std::env::var(var).map_err(|_| ConfigError::MissingEnv(var.clone()));
        }
        self.password.clone().ok_or(ConfigError::NoCredential)
    }
}
