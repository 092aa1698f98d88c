//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The negotiation call answered `ok: false`. Carries the service's error string.
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Returns the raw error string reported by the service for auth failures.
    pub fn auth_reason(&self) -> Option<&str> {
        match self {
            BotError::Auth(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
