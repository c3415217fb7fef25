//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of the underlying random source
#[derive(Error, Debug)]
#[error("random source unavailable: {0}")]
pub struct RandomError(pub String);

/// Reasons a `/roll` command is rejected.
///
/// Rejection variants display as the exact text sent back to the chat.
#[derive(Error, Debug)]
pub enum RollError {
    #[error("Invalid dice (use xdy format)")]
    InvalidFormat,

    #[error("Use maximum of {max} dice")]
    TooManyDice { max: i64 },

    #[error("Use maximum of {max} sided dice")]
    DiceTooLarge { max: i64 },

    #[error("Use minimum of 1 dice")]
    TooFewDice,

    #[error("Use minimum of 1 sided dice")]
    TooFewSides,

    #[error("random generator failure: {0}")]
    Generation(#[from] RandomError),
}

impl RollError {
    /// Text shown to the chat. Generation failures never expose their cause.
    pub fn reply(&self) -> String {
        match self {
            RollError::Generation(_) => "Whoops, I lost the dice".to_string(),
            other => other.to_string(),
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
