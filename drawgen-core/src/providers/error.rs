//! Provider error types and handling

use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when talking to LLM providers.
///
/// Malformed stream lines are deliberately *not* represented here: they
/// are recovered locally by the decoders (skipped with a diagnostic) and
/// never abort a stream.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network or connection error
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Non-success HTTP status from the provider before streaming began
    #[error("{provider} API error: {status} {body}")]
    Upstream {
        provider: String,
        status: u16,
        body: String,
    },

    /// Invalid request that must not reach the wire
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Request or stream timed out
    #[error("Request timed out")]
    Timeout,

    /// Response parsing error
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::Network(format!("Connection failed: {}", err))
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<crate::config::ConfigError> for ProviderError {
    fn from(err: crate::config::ConfigError) -> Self {
        ProviderError::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_carries_no_duration() {
        // The configured timeouts differ per call site, so the message
        // must not claim a specific number of seconds.
        assert_eq!(ProviderError::Timeout.to_string(), "Request timed out");
    }
}
