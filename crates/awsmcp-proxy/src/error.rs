//! Error types for awsmcp-proxy
//!
//! One enum covers every way a forwarded request can fail. Each variant knows
//! the HTTP status it surfaces as and the short message the client sees; the
//! `Display` text is richer and meant for logs.
//!
//! | variant | status |
//! |---|---|
//! | `InvalidRequest` | 400 |
//! | `AuthenticationFailed` | 401 |
//! | `UpstreamTimeout` | 504 |
//! | `UpstreamError` | upstream's own status |
//! | `InvalidUpstreamResponse` | 500 |
//! | `Internal`, `Configuration`, `Io` | 500 |

use std::fmt;

use awsmcp_auth::AuthError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Result type for proxy operations
pub type ProxyResult<T> = std::result::Result<T, ProxyError>;

/// Body framing the upstream used for a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// `application/json` (or anything that is not an event stream)
    Json,
    /// `text/event-stream`
    Sse,
}

impl fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("JSON"),
            Self::Sse => f.write_str("SSE"),
        }
    }
}

/// Main error type for awsmcp-proxy
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ProxyError {
    /// Inbound body is not a structurally valid JSON-RPC request
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Client-facing reason
        message: String,
    },

    /// No usable token could be obtained from the authorization server
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(#[from] AuthError),

    /// Upstream MCP call exceeded its deadline
    #[error("Upstream MCP server timed out after {timeout_ms}ms")]
    UpstreamTimeout {
        /// Deadline that was exceeded
        timeout_ms: u64,
    },

    /// Upstream answered with a status other than 200 or 202
    #[error("Upstream MCP server returned HTTP {status}")]
    UpstreamError {
        /// Status code returned by the upstream
        status: u16,
        /// Raw upstream body, kept for diagnostics
        body: String,
    },

    /// Upstream body could not be decoded
    #[error("Invalid {format} response from upstream MCP server: {message}")]
    InvalidUpstreamResponse {
        /// Framing the body was parsed as
        format: ResponseFormat,
        /// Decoder error
        message: String,
    },

    /// Any other failure in the forwarding path
    #[error("Internal error: {message}")]
    Internal {
        /// What went wrong
        message: String,
    },

    /// Invalid gateway configuration (startup only)
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
        /// Setting that caused the failure, if known
        key: Option<String>,
    },

    /// IO error (binding the listener, serving)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    /// Create an invalid-request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an invalid-upstream-response error
    pub fn invalid_upstream_response(format: ResponseFormat, message: impl Into<String>) -> Self {
        Self::InvalidUpstreamResponse {
            format,
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: None,
        }
    }

    /// Create a configuration error with key context
    pub fn configuration_with_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// HTTP status this error surfaces as
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            Self::AuthenticationFailed(_) => StatusCode::UNAUTHORIZED,
            Self::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::UpstreamError { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::InvalidUpstreamResponse { .. }
            | Self::Internal { .. }
            | Self::Configuration { .. }
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short message returned to the client
    ///
    /// Never contains credentials or tokens. Upstream error bodies are passed
    /// through so callers can see why the MCP server refused the request.
    pub fn detail(&self) -> String {
        match self {
            Self::InvalidRequest { message } => message.clone(),
            Self::AuthenticationFailed(_) => "Authentication failed".to_string(),
            Self::UpstreamTimeout { .. } => "AWS MCP server timeout".to_string(),
            Self::UpstreamError { body, .. } => format!("AWS MCP server error: {body}"),
            Self::InvalidUpstreamResponse { format, .. } => {
                format!("Invalid {format} response from AWS MCP server")
            }
            Self::Internal { .. } | Self::Configuration { .. } | Self::Io(_) => {
                "Internal server error".to_string()
            }
        }
    }

    /// Whether the client sent something invalid
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest { .. })
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "detail": self.detail() });
        (self.status_code(), Json(body)).into_response()
    }
}
