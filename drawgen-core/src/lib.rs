//! Drawgen Core Library
//!
//! Streaming pipeline for AI-generated diagrams: provider stream
//! decoders for OpenAI- and Anthropic-compatible APIs, the relay event
//! protocol, the client-side stream session, and the incremental JSON
//! repair that turns a partially-received reply into structured diagram
//! elements as early as possible.

pub mod config;
pub mod prompts;
pub mod protocol;
pub mod providers;
pub mod repair;
pub mod session;

use protocol::ChatMessage;

/// Build the fixed two-message conversation for one generation request.
pub fn build_conversation(user_input: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(prompts::SYSTEM_PROMPT),
        ChatMessage::user(prompts::user_prompt(user_input)),
    ]
}

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
