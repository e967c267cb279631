use std::path::PathBuf;

use compact_str::CompactString;
use thiserror::Error;

use crate::client::ClientError;

pub type Result<T> = std::result::Result<T, BotError>;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("Missing required environment variable: {name}")]
    MissingCredential { name: &'static str },

    #[error("Configuration file not found: {path}")]
    ConfigFileNotFound { path: PathBuf },

    #[error("Failed to load configuration from {path}: {message}")]
    ConfigLoadError { path: PathBuf, message: String },

    #[error("Invalid configuration: {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Failed to initialize logging: {0}")]
    LoggingError(CompactString),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl BotError {
    /// Create a configuration file not found error
    pub fn config_file_not_found(path: PathBuf) -> Self {
        Self::ConfigFileNotFound { path }
    }

    /// Create a configuration load error
    pub fn config_load_error(path: PathBuf, source: impl std::fmt::Display) -> Self {
        Self::ConfigLoadError { path, message: source.to_string() }
    }

    /// Create a configuration validation error
    pub fn config_validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidationError { field: field.into(), message: message.into() }
    }

    pub fn logging_error(source: impl std::fmt::Display) -> Self {
        Self::LoggingError(source.to_string().into())
    }
}
