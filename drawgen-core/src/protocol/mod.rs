//! Core protocol types for the generation pipeline

pub mod types;

pub use types::{
    ChatMessage, GenerateRequest, MessageRole, ModelInfo, StreamEvent, DONE_MARKER,
};
