//! Provider integration layer
//!
//! Turns one configured provider call into an ordered stream of text
//! deltas, with the decoding rules each API family needs.

pub mod anthropic;
pub mod client;
pub mod error;
pub mod openai;
pub mod streaming;

pub use client::{ChatStreamer, LlmClient};
pub use error::{ProviderError, ProviderResult};
pub use streaming::{DeltaStream, LineAssembler, StreamDecoder};

// Re-export concrete decoders
pub use anthropic::AnthropicDecoder;
pub use openai::OpenAiDecoder;
