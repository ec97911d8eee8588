//! Application layer errors

use std::path::PathBuf;
use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the messaging platform
    #[error("API error {status}: {description}")]
    Api { status: u16, description: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),
}

/// Command execution errors
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file exists but does not hold a user directory
    #[error("Corrupt user store {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
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
