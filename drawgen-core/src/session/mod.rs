//! Client-side stream session
//!
//! Consumes the relay's uniform SSE event stream, owns the accumulated
//! text for one in-flight generation, and runs the repair pipeline on
//! every increment for a best-effort live preview.
//!
//! Superseding is explicit: a [`SessionManager`] hands out monotonically
//! increasing generation ids, and a reader whose id is no longer the
//! latest stops consuming and discards its buffer instead of applying
//! stale results.

use crate::protocol::StreamEvent;
use crate::providers::{LineAssembler, ProviderError};
use crate::repair;
use futures::{Stream, StreamExt};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while reading a relay stream
#[derive(Debug, Error)]
pub enum SessionError {
    /// The relay carried one `{"error": ...}` event
    #[error("Generation failed: {0}")]
    Relay(String),

    /// The transport itself failed mid-stream
    #[error(transparent)]
    Transport(#[from] ProviderError),
}

/// Issues generation ids; the latest id wins.
#[derive(Debug, Default, Clone)]
pub struct SessionManager {
    latest: Arc<AtomicU64>,
}

impl SessionManager {
    /// Create a manager with no generation in flight
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new generation, implicitly invalidating all earlier ones.
    pub fn begin(&self) -> GenerationHandle {
        let id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        GenerationHandle {
            id,
            latest: Arc::clone(&self.latest),
        }
    }
}

/// Identity of one generation request
#[derive(Debug, Clone)]
pub struct GenerationHandle {
    id: u64,
    latest: Arc<AtomicU64>,
}

impl GenerationHandle {
    /// True while no newer generation has started.
    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.id
    }

    /// This generation's id
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// One live preview snapshot, produced after each content delta.
#[derive(Debug, Clone)]
pub struct Preview {
    /// Repaired accumulated text
    pub code: String,

    /// Parsed element list when the buffer already holds a complete
    /// top-level array; `None` means "not ready yet", never an error.
    pub elements: Option<Vec<Value>>,
}

/// Terminal result of a completed generation
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Final repaired text
    pub code: String,

    /// Final parsed element list, authoritative when present
    pub elements: Option<Vec<Value>>,
}

/// How a read loop ended
#[derive(Debug)]
pub enum Outcome {
    /// The stream ran to its end-of-stream marker (or transport close)
    Complete(GenerationOutcome),

    /// A newer generation started; nothing was applied
    Superseded,
}

/// Read one relay SSE stream to completion.
///
/// For each `{"content": ...}` event the delta is appended to the
/// accumulated text and `on_preview` is invoked with the repaired buffer
/// and a best-effort parse. The `[DONE]` marker stops reading without
/// being treated as data; an `{"error": ...}` event aborts with
/// [`SessionError::Relay`]. Malformed events are skipped with a
/// diagnostic. The loop also stops, without applying anything further,
/// as soon as `handle` is no longer current.
pub async fn read_stream<S, E, F>(
    transport: S,
    handle: &GenerationHandle,
    mut on_preview: F,
) -> Result<Outcome, SessionError>
where
    S: Stream<Item = Result<bytes::Bytes, E>>,
    E: std::fmt::Display,
    F: FnMut(Preview),
{
    futures::pin_mut!(transport);

    let mut lines = LineAssembler::new();
    let mut accumulated = String::new();

    'read: while let Some(item) = transport.next().await {
        if !handle.is_current() {
            tracing::debug!("Generation {} superseded, dropping stream", handle.id);
            return Ok(Outcome::Superseded);
        }

        let chunk = match item {
            Ok(chunk) => chunk,
            Err(e) => {
                return Err(SessionError::Transport(ProviderError::Network(
                    e.to_string(),
                )))
            }
        };

        for line in lines.push(&chunk) {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let Some(payload) = trimmed.strip_prefix("data: ") else {
                continue;
            };

            match StreamEvent::from_wire(payload) {
                Ok(StreamEvent::Done) => break 'read,
                Ok(StreamEvent::Error(message)) => {
                    return Err(SessionError::Relay(message));
                }
                Ok(StreamEvent::ContentDelta(delta)) => {
                    accumulated.push_str(&delta);
                    let code = repair::repair(&accumulated);
                    let elements = repair::parse_elements(&code);
                    on_preview(Preview { code, elements });
                }
                Err(raw) => {
                    tracing::warn!("Skipping malformed relay event: {}", raw);
                }
            }
        }
    }

    if !handle.is_current() {
        return Ok(Outcome::Superseded);
    }

    let code = repair::repair(&accumulated);
    let elements = repair::parse_elements(&code);
    Ok(Outcome::Complete(GenerationOutcome { code, elements }))
}
