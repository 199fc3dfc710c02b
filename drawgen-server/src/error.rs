//! HTTP error responses
//!
//! Failures that happen before the SSE stream opens are returned as a
//! structured JSON error with an HTTP error status, never as a stream.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use drawgen_core::providers::ProviderError;
use serde_json::json;

/// A non-streaming API failure: `{"error": message}` with a status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// A client-side request problem (missing fields, invalid config)
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        let status = match &err {
            ProviderError::InvalidRequest(_) | ProviderError::Configuration(_) => {
                StatusCode::BAD_REQUEST
            }
            ProviderError::Upstream { .. }
            | ProviderError::Authentication(_)
            | ProviderError::Network(_)
            | ProviderError::Timeout => StatusCode::BAD_GATEWAY,
            ProviderError::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
