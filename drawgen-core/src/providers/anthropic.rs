//! Anthropic-compatible wire types and stream decoding
//!
//! The messages API differs from OpenAI in two ways that matter here:
//! the system prompt travels as a top-level `system` field rather than a
//! chat message, and streamed text arrives only in records whose `type`
//! is `content_block_delta`.

use super::streaming::{LineAssembler, StreamDecoder};
use crate::protocol::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// Default max_tokens for Anthropic requests, which require the field
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// API version header value required by Anthropic
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic messages request
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub messages: Vec<AnthropicMessage>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    pub max_tokens: u32,
    pub stream: bool,
}

/// Anthropic message format (non-system roles only)
#[derive(Debug, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Anthropic streaming event, reduced to the fields the decoder inspects
#[derive(Debug, Deserialize)]
pub struct AnthropicStreamEvent {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default)]
    pub delta: Option<AnthropicDelta>,
}

/// Incremental content-block delta
#[derive(Debug, Deserialize)]
pub struct AnthropicDelta {
    #[serde(default)]
    pub text: Option<String>,
}

/// Build an Anthropic streaming request body.
///
/// Splits the conversation into one optional system text (the first
/// system message) and the ordered non-system messages; the system text
/// is never placed inside `messages`.
pub fn build_request(model: &str, messages: &[ChatMessage]) -> AnthropicRequest {
    let system = messages
        .iter()
        .find(|m| m.role == MessageRole::System)
        .map(|m| m.content.clone());

    let chat_messages = messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .map(|m| AnthropicMessage {
            role: match m.role {
                MessageRole::User => "user".to_string(),
                MessageRole::Assistant => "assistant".to_string(),
                MessageRole::System => unreachable!("system messages filtered above"),
            },
            content: m.content.clone(),
        })
        .collect();

    AnthropicRequest {
        model: model.to_string(),
        messages: chat_messages,
        system,
        max_tokens: DEFAULT_MAX_TOKENS,
        stream: true,
    }
}

/// Decoder for Anthropic-style SSE streams.
///
/// Only `content_block_delta` records contribute text, taken from
/// `delta.text`. `event:` lines and other record types (message_start,
/// ping, message_stop, ...) are ignored; malformed JSON is logged and
/// skipped.
#[derive(Debug, Default)]
pub struct AnthropicDecoder {
    lines: LineAssembler,
    full_text: String,
    done: bool,
}

impl AnthropicDecoder {
    /// Create a fresh decoder for one response stream
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_line(&mut self, line: &str) -> Option<String> {
        if self.done {
            return None;
        }
        let trimmed = line.trim();
        let payload = trimmed.strip_prefix("data: ")?;

        match serde_json::from_str::<AnthropicStreamEvent>(payload) {
            Ok(event) => {
                if event.kind == "message_stop" {
                    self.done = true;
                    return None;
                }
                if event.kind != "content_block_delta" {
                    return None;
                }
                let text = event.delta.and_then(|d| d.text)?;
                if text.is_empty() {
                    return None;
                }
                self.full_text.push_str(&text);
                Some(text)
            }
            Err(e) => {
                tracing::warn!("Failed to parse Anthropic stream line: {}", e);
                None
            }
        }
    }
}

impl StreamDecoder for AnthropicDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let lines = self.lines.push(chunk);
        lines
            .iter()
            .filter_map(|line| self.decode_line(line))
            .collect()
    }

    fn finish(&mut self) -> Vec<String> {
        match self.lines.finish() {
            Some(line) => self.decode_line(&line).into_iter().collect(),
            None => Vec::new(),
        }
    }

    fn full_text(&self) -> &str {
        &self.full_text
    }

    fn is_done(&self) -> bool {
        self.done
    }
}
