//! Configuration error types

use thiserror::Error;

/// Errors raised while loading, saving, or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the configuration file
    #[error("I/O error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file failed to parse
    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// A referenced environment variable is not set
    #[error("Environment variable not found: {var}")]
    EnvVarNotFound { var: String },

    /// A required field is empty or missing
    #[error("Invalid configuration: {field} must not be empty")]
    MissingField { field: &'static str },
}
