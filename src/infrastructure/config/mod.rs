//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::application::messaging::dispatcher::DEFAULT_PREFIX;

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    pub ignore_own_messages: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct SlackConfig {
    pub token: Option<String>,
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: "rtm-bot".to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            ignore_own_messages: false,
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_api_url(),
        }
    }
}

impl SlackConfig {
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ConfigError::MissingField("slack.token".to_string()))
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slack.api_url.is_empty() {
            return Err(ConfigError::InvalidValue("slack.api-url must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn load_env() -> Self {
        let mut config = Config::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Override fields from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("SLACK_TOKEN") {
            self.slack.token = Some(token);
        }

        if let Some(prefix) = lookup("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Some(api_url) = lookup("SLACK_API_URL") {
            self.slack.api_url = api_url;
        }
    }
}
