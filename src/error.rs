//! Error types for the content gateway and the reverse proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::{ErrorResponse, UpstreamErrorResponse};

// == Gateway Error Enum ==
/// Failures of the content gateway that are surfaced to the caller.
///
/// Unparseable provider output is not an error: it is answered with the
/// fallback content instead. `Clone` is required so a single in-flight
/// generation can hand its outcome to every waiting request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// Missing or empty request fields
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Provider answered with a non-success status
    #[error("Provider returned status {status}")]
    Upstream { status: u16, body: String },

    /// Provider could not be reached or did not answer in time
    #[error("Provider transport failure: {0}")]
    Transport(String),

    /// No API key configured for the provider
    #[error("Server missing OPENAI_API_KEY")]
    MissingApiKey,

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(msg))).into_response()
            }
            GatewayError::Upstream { status, body } => {
                tracing::warn!(status, "Provider error relayed to client");
                let payload = UpstreamErrorResponse {
                    error: "OpenAI API error".to_string(),
                    status,
                    body,
                };
                (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
            }
            GatewayError::MissingApiKey => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Server missing OPENAI_API_KEY")),
            )
                .into_response(),
            GatewayError::Transport(msg) | GatewayError::Internal(msg) => {
                tracing::error!(error = %msg, "Content request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::new("Internal server error")),
                )
                    .into_response()
            }
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the content gateway.
pub type Result<T> = std::result::Result<T, GatewayError>;

// == Proxy Error Enum ==
/// Failures of the reverse proxy, answered with plain-text bodies.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Upstream could not be reached, or failed mid-exchange
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The outbound request could not be built
    #[error("Failed to build upstream request: {0}")]
    InternalSetup(String),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ProxyError::UpstreamUnavailable(_) => (StatusCode::BAD_GATEWAY, "Bad gateway"),
            ProxyError::InternalSetup(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        tracing::error!(error = %self, "Proxy request error");

        (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
    }
}

// == Config Error Enum ==
/// Startup configuration failures. These are fatal.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// No upstream target given
    #[error("missing proxy target")]
    MissingTarget,

    /// Target is not an absolute http(s) URL
    #[error("invalid proxy target '{0}': {1}")]
    InvalidTarget(String, String),
}
