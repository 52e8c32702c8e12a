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
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid listen address: {0}")]
    InvalidHost(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("Write timeout must be shorter than read timeout")]
    WriteTimeoutTooLong,

    #[error("Keep-alive interval must be shorter than read timeout")]
    KeepaliveTooSlow,
}
