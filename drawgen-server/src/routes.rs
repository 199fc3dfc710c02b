//! HTTP routes: the SSE generation relay and model listing
//!
//! `POST /api/generate` bridges one browser request to one provider
//! call. The provider stream is opened before the response is committed,
//! so pre-stream failures become HTTP error JSON; once streaming has
//! begun, every decoded delta is re-emitted as one `{"content": ...}`
//! event, a failure becomes exactly one `{"error": ...}` event, and the
//! stream always ends with the literal `[DONE]` marker.

use crate::error::ApiError;
use axum::extract::{Query, State};
use axum::http::header::{CACHE_CONTROL, CONNECTION};
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use drawgen_core::config::ProviderKind;
use drawgen_core::protocol::{GenerateRequest, StreamEvent};
use drawgen_core::providers::{ChatStreamer, LlmClient};
use futures::StreamExt;
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

/// Shared state: one pooled client for every request; requests share no
/// mutable state beyond it.
pub struct AppState {
    pub client: LlmClient,

    /// Maximum silence between two deltas before the provider is
    /// considered hung and the stream is failed mid-flight.
    pub stream_idle_timeout: Duration,
}

impl AppState {
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            stream_idle_timeout: Duration::from_secs(120),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/models", get(models))
        .with_state(state)
}

async fn generate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let config = request.validate().map_err(ApiError::bad_request)?.clone();
    let messages = drawgen_core::build_conversation(&request.user_input);

    info!("Starting generation via {}", config.label());

    // Open the provider stream before committing to an SSE response;
    // anything that fails here returns an HTTP error, not a stream.
    let mut deltas = state.client.stream_chat(&config, messages).await?;

    let idle_timeout = state.stream_idle_timeout;
    let (tx, rx) = mpsc::channel::<Event>(32);

    tokio::spawn(async move {
        loop {
            let next = tokio::time::timeout(idle_timeout, deltas.next()).await;
            match next {
                Err(_) => {
                    warn!("Provider stream idle for {:?}, aborting", idle_timeout);
                    let event = StreamEvent::Error(format!(
                        "Provider stream timed out after {} seconds of silence",
                        idle_timeout.as_secs()
                    ));
                    let _ = tx.send(Event::default().data(event.to_wire())).await;
                    break;
                }
                Ok(None) => break,
                Ok(Some(Ok(delta))) => {
                    let event = StreamEvent::ContentDelta(delta);
                    if tx.send(Event::default().data(event.to_wire())).await.is_err() {
                        // Client went away; stop pulling from the provider.
                        break;
                    }
                }
                Ok(Some(Err(e))) => {
                    warn!("Provider stream failed: {}", e);
                    let event = StreamEvent::Error(e.to_string());
                    let _ = tx.send(Event::default().data(event.to_wire())).await;
                    break;
                }
            }
        }

        let _ = tx
            .send(Event::default().data(StreamEvent::Done.to_wire()))
            .await;
    });

    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok((
        [(CACHE_CONTROL, "no-cache"), (CONNECTION, "keep-alive")],
        Sse::new(stream),
    ))
}

/// Query parameters for model listing, matching the browser's
/// `?type=&baseUrl=&apiKey=` convention.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsQuery {
    #[serde(rename = "type")]
    kind: ProviderKind,
    base_url: String,
    api_key: String,
}

async fn models(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ModelsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let models = state
        .client
        .list_models(query.kind, &query.base_url, &query.api_key)
        .await?;
    Ok(Json(models))
}
