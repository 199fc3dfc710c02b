//! OpenAI-compatible wire types and stream decoding
//!
//! These types match the OpenAI chat completion API format and are used
//! for serialization when talking to any OpenAI-compatible endpoint.

use super::streaming::{LineAssembler, StreamDecoder};
use crate::protocol::{ChatMessage, MessageRole};
use serde::{Deserialize, Serialize};

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub stream: bool,
}

/// OpenAI message format
#[derive(Debug, Serialize)]
pub struct OpenAiMessage {
    pub role: String,
    pub content: String,
}

/// OpenAI streaming chunk, reduced to the fields the decoder inspects
#[derive(Debug, Deserialize)]
pub struct OpenAiStreamChunk {
    #[serde(default)]
    pub choices: Vec<OpenAiStreamChoice>,
}

/// One streamed choice
#[derive(Debug, Deserialize)]
pub struct OpenAiStreamChoice {
    #[serde(default)]
    pub delta: OpenAiDelta,
}

/// Incremental message delta
#[derive(Debug, Default, Deserialize)]
pub struct OpenAiDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Build an OpenAI streaming request body from the conversation.
pub fn build_request(model: &str, messages: &[ChatMessage]) -> OpenAiRequest {
    OpenAiRequest {
        model: model.to_string(),
        messages: messages
            .iter()
            .map(|m| OpenAiMessage {
                role: match m.role {
                    MessageRole::System => "system".to_string(),
                    MessageRole::User => "user".to_string(),
                    MessageRole::Assistant => "assistant".to_string(),
                },
                content: m.content.clone(),
            })
            .collect(),
        stream: true,
    }
}

/// Decoder for OpenAI-style SSE streams.
///
/// Each complete `data: <json>` line contributes
/// `choices[0].delta.content` when present and non-empty; the literal
/// `data: [DONE]` record ends the logical stream. Lines that fail to
/// parse are logged and skipped.
#[derive(Debug, Default)]
pub struct OpenAiDecoder {
    lines: LineAssembler,
    full_text: String,
    done: bool,
}

impl OpenAiDecoder {
    /// Create a fresh decoder for one response stream
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_line(&mut self, line: &str) -> Option<String> {
        let trimmed = line.trim();
        if trimmed.is_empty() || self.done {
            return None;
        }
        if trimmed == "data: [DONE]" {
            self.done = true;
            return None;
        }

        let payload = trimmed.strip_prefix("data: ")?;
        match serde_json::from_str::<OpenAiStreamChunk>(payload) {
            Ok(chunk) => {
                let content = chunk
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.delta.content)?;
                if content.is_empty() {
                    return None;
                }
                self.full_text.push_str(&content);
                Some(content)
            }
            Err(e) => {
                tracing::warn!("Failed to parse OpenAI stream line: {}", e);
                None
            }
        }
    }
}

impl StreamDecoder for OpenAiDecoder {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_content_deltas() {
        let mut decoder = OpenAiDecoder::new();
        let deltas = decoder.feed(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\
              data: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\
              data: [DONE]\n",
        );
        assert_eq!(deltas, vec!["Hello", " world"]);
        assert_eq!(decoder.full_text(), "Hello world");
        assert!(decoder.is_done());
    }

    #[test]
    fn skips_empty_and_absent_deltas() {
        let mut decoder = OpenAiDecoder::new();
        let deltas = decoder.feed(
            b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\
              data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n\
              data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n",
        );
        assert_eq!(deltas, vec!["x"]);
    }

    #[test]
    fn malformed_lines_do_not_abort() {
        let mut decoder = OpenAiDecoder::new();
        let deltas = decoder.feed(
            b"data: {broken\n\
              data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n",
        );
        assert_eq!(deltas, vec!["ok"]);
    }

    #[test]
    fn nothing_decoded_after_done() {
        let mut decoder = OpenAiDecoder::new();
        decoder.feed(b"data: [DONE]\n");
        let deltas =
            decoder.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n");
        assert!(deltas.is_empty());
        assert_eq!(decoder.full_text(), "");
    }

    #[test]
    fn builds_streaming_request_body() {
        let request = build_request(
            "gpt-4o",
            &[ChatMessage::system("sys"), ChatMessage::user("hi")],
        );
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["stream"], true);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "hi");
    }
}
