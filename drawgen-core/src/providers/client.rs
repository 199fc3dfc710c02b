//! HTTP client for upstream LLM providers
//!
//! One pooled `reqwest` client serves every request; each generation
//! request gets an independent decode session, so concurrent requests
//! share no mutable state.

use super::anthropic::{self, AnthropicDecoder, ANTHROPIC_VERSION};
use super::error::{ProviderError, ProviderResult};
use super::openai::{self, OpenAiDecoder};
use super::streaming::{decode_stream, DeltaStream};
use crate::config::{ProviderConfig, ProviderKind};
use crate::protocol::{ChatMessage, ModelInfo};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Default user agent
const USER_AGENT: &str = concat!("drawgen/", env!("CARGO_PKG_VERSION"));

/// Timeout for non-streaming calls such as model listing
const LIST_TIMEOUT: Duration = Duration::from_secs(15);

/// Built-in Anthropic model catalogue; Anthropic exposes no discovery
/// endpoint.
const ANTHROPIC_MODELS: &[(&str, &str)] = &[
    ("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet"),
    ("claude-3-5-haiku-20241022", "Claude 3.5 Haiku"),
    ("claude-3-opus-20240229", "Claude 3 Opus"),
    ("claude-3-sonnet-20240229", "Claude 3 Sonnet"),
    ("claude-3-haiku-20240307", "Claude 3 Haiku"),
];

/// Seam for callers that stream chat completions; lets the relay be
/// exercised against a scripted streamer in tests.
#[async_trait]
pub trait ChatStreamer: Send + Sync {
    /// Open one streaming chat completion and return its delta stream.
    ///
    /// Fails before any streaming begins when the provider answers with
    /// a non-success status; the response body is carried as detail.
    async fn stream_chat(
        &self,
        config: &ProviderConfig,
        messages: Vec<ChatMessage>,
    ) -> ProviderResult<DeltaStream>;
}

/// Shared HTTP client with connection pooling
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct OpenAiModelList {
    #[serde(default)]
    data: Vec<OpenAiModelEntry>,
}

#[derive(Debug, Deserialize)]
struct OpenAiModelEntry {
    id: String,
}

impl LlmClient {
    /// Create a new client with default settings.
    ///
    /// No overall request timeout is set: streaming responses are
    /// open-ended, and the relay applies its own idle deadline between
    /// deltas.
    pub fn new() -> ProviderResult<Self> {
        Self::with_connect_timeout(Duration::from_secs(10))
    }

    /// Create a new client with a custom connect timeout
    pub fn with_connect_timeout(connect_timeout: Duration) -> ProviderResult<Self> {
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(connect_timeout)
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }

    /// List the models available from a provider.
    ///
    /// OpenAI-compatible providers are queried via `GET {base}/models`;
    /// Anthropic returns the built-in catalogue. Takes the credential
    /// pieces directly so a model can be listed before one is chosen.
    pub async fn list_models(
        &self,
        kind: ProviderKind,
        base_url: &str,
        api_key: &str,
    ) -> ProviderResult<Vec<ModelInfo>> {
        match kind {
            ProviderKind::OpenAi => {
                let url = format!("{}/models", base_url);
                debug!("Listing models from {}", url);

                let response = self
                    .client
                    .get(&url)
                    .timeout(LIST_TIMEOUT)
                    .header("Authorization", format!("Bearer {}", api_key))
                    .send()
                    .await?;

                let response = Self::check_status("openai", response).await?;
                let list: OpenAiModelList = response
                    .json()
                    .await
                    .map_err(|e| ProviderError::Parse(e.to_string()))?;

                Ok(list
                    .data
                    .into_iter()
                    .map(|m| ModelInfo {
                        name: m.id.clone(),
                        id: m.id,
                    })
                    .collect())
            }
            ProviderKind::Anthropic => Ok(ANTHROPIC_MODELS
                .iter()
                .map(|(id, name)| ModelInfo {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                })
                .collect()),
        }
    }

    async fn stream_openai(
        &self,
        config: &ProviderConfig,
        messages: &[ChatMessage],
        request_id: Uuid,
    ) -> ProviderResult<DeltaStream> {
        let url = format!("{}/chat/completions", config.base_url);
        let body = openai::build_request(&config.model, messages);
        debug!("Request URL: {} [request_id: {}]", url, request_id);

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", config.api_key.expose_secret()),
            )
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status("openai", response).await?;
        Ok(decode_stream(response.bytes_stream(), OpenAiDecoder::new()))
    }

    async fn stream_anthropic(
        &self,
        config: &ProviderConfig,
        messages: &[ChatMessage],
        request_id: Uuid,
    ) -> ProviderResult<DeltaStream> {
        let url = format!("{}/messages", config.base_url);
        let body = anthropic::build_request(&config.model, messages);
        debug!("Request URL: {} [request_id: {}]", url, request_id);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", config.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        let response = Self::check_status("anthropic", response).await?;
        Ok(decode_stream(
            response.bytes_stream(),
            AnthropicDecoder::new(),
        ))
    }

    /// Fail with the response body as detail on a non-success status.
    async fn check_status(provider: &str, response: Response) -> ProviderResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!("{} request failed with status {}", provider, status);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::Authentication(body));
        }
        Err(ProviderError::Upstream {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl ChatStreamer for LlmClient {
    async fn stream_chat(
        &self,
        config: &ProviderConfig,
        messages: Vec<ChatMessage>,
    ) -> ProviderResult<DeltaStream> {
        config.validate()?;

        let request_id = Uuid::new_v4();
        info!(
            "Opening {} stream for model {} [request_id: {}]",
            config.label(),
            config.model,
            request_id
        );

        match config.kind {
            ProviderKind::OpenAi => self.stream_openai(config, &messages, request_id).await,
            ProviderKind::Anthropic => self.stream_anthropic(config, &messages, request_id).await,
        }
    }
}
