//! Fundamental data structures shared by the relay, the provider clients,
//! and the stream session.
//!
//! The design prioritizes:
//! - Type safety through enums and strong typing
//! - A single, explicit wire representation for relay events
//! - Forward compatibility through optional fields

use crate::config::ProviderConfig;
use serde::{Deserialize, Serialize};

/// Sentinel line payload that terminates a relay event stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instructions that guide the model's behavior
    System,
    /// User input message
    User,
    /// Assistant (model) response
    Assistant,
}

/// A message in the conversation sent to a provider.
///
/// Constructed once per generation request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,

    /// Plain text content
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// One event on the relay's uniform transport.
///
/// Contract (per stream):
/// - zero or more `ContentDelta` events, in provider emission order;
/// - at most one `Error` event;
/// - exactly one `Done` marker after either completion or error.
///
/// After `Done` no further events are emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Partial generated text (delta)
    ContentDelta(String),
    /// Failure surfaced mid-stream; the stream ends after this
    Error(String),
    /// End-of-stream marker
    Done,
}

/// Serde shape of a non-terminal relay frame: `{"content": ...}` or
/// `{"error": ...}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct RelayFrame {
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl StreamEvent {
    /// Returns true if this event terminates the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Error(_) | Self::Done)
    }

    /// Convenience accessor for `ContentDelta` contents.
    pub fn as_content(&self) -> Option<&str> {
        match self {
            Self::ContentDelta(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Encode this event as the payload of one `data:` line.
    ///
    /// `Done` encodes as the literal marker, not as JSON.
    pub fn to_wire(&self) -> String {
        match self {
            Self::ContentDelta(content) => serde_json::to_string(&RelayFrame {
                content: Some(content.clone()),
                error: None,
            })
            .unwrap_or_default(),
            Self::Error(message) => serde_json::to_string(&RelayFrame {
                content: None,
                error: Some(message.clone()),
            })
            .unwrap_or_default(),
            Self::Done => DONE_MARKER.to_string(),
        }
    }

    /// Decode the payload of one `data:` line.
    ///
    /// Returns `Err` with the raw payload when the frame is not the done
    /// marker and does not parse as a relay frame.
    pub fn from_wire(payload: &str) -> Result<Self, String> {
        if payload == DONE_MARKER {
            return Ok(Self::Done);
        }

        let frame: RelayFrame =
            serde_json::from_str(payload).map_err(|_| payload.to_string())?;

        if let Some(error) = frame.error {
            Ok(Self::Error(error))
        } else if let Some(content) = frame.content {
            Ok(Self::ContentDelta(content))
        } else {
            Err(payload.to_string())
        }
    }
}

/// Body of a browser-initiated generation request:
/// `{"config": ..., "userInput": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Provider configuration, read-only for the lifetime of the request
    pub config: Option<ProviderConfig>,

    /// Free-text description of the diagram to generate
    #[serde(default, rename = "userInput")]
    pub user_input: String,
}

impl GenerateRequest {
    /// Validate that both required fields are present and usable.
    pub fn validate(&self) -> Result<&ProviderConfig, String> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| "Missing required parameters: config, userInput".to_string())?;

        if self.user_input.trim().is_empty() {
            return Err("Missing required parameters: config, userInput".to_string());
        }

        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

/// One model offered by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Provider-side model identifier
    pub id: String,

    /// Human-readable name
    pub name: String,
}
