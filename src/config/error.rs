//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid content URL format")]
    InvalidContentUrl,

    #[error("Invalid questionnaire URL format")]
    InvalidSourceUrl,

    #[error("Layout spacing must be positive: {0}")]
    InvalidSpacing(&'static str),

    #[error("Storage key must be non-empty and use only letters, digits, '.', '_' or '-': {0}")]
    InvalidStorageKey(&'static str),
}
