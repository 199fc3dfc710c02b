//! Provider configuration schema

use super::error::ConfigError;
use super::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported provider API families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI-compatible chat completion API
    #[serde(rename = "openai")]
    OpenAi,
    /// Anthropic-compatible messages API
    Anthropic,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
        }
    }
}

/// Configuration for one LLM provider.
///
/// Read-only shared state for the streaming pipeline: created by the
/// configuration surface, read once at request-build time, never mutated
/// by the core.
/// The wire shape uses the browser's key convention: `type`, `baseUrl`,
/// `apiKey`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConfig {
    /// Which API family to speak
    #[serde(rename = "type")]
    pub kind: ProviderKind,

    /// Optional display name, UI only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// API base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,

    /// API key, redacted in Debug/Display output
    pub api_key: SecretString,

    /// Model identifier to request
    pub model: String,
}

impl ProviderConfig {
    /// Create a configuration with no display name
    pub fn new(
        kind: ProviderKind,
        base_url: impl Into<String>,
        api_key: impl Into<SecretString>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: None,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Enforce the non-empty invariant on every field except the display
    /// name. No generation request may be issued against an invalid
    /// configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "baseUrl" });
        }
        if self.api_key.is_empty() {
            return Err(ConfigError::MissingField { field: "apiKey" });
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "model" });
        }
        Ok(())
    }

    /// Label used in logs: display name when present, otherwise the kind.
    pub fn label(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => match self.kind {
                ProviderKind::OpenAi => "openai",
                ProviderKind::Anthropic => "anthropic",
            },
        }
    }
}
