//! Error types for awsmcp-auth
//!
//! Every variant describes a way the client-credentials exchange can fail to
//! produce a usable bearer token. Callers generally collapse all of them into a
//! single "authentication failed" outcome; the variants exist for logging.

use std::sync::Arc;

use thiserror::Error;

/// Result type for token operations
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Failure while obtaining an access token
///
/// Cloneable so one failed refresh can be reported to every caller that was
/// waiting on it.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum AuthError {
    /// The token request could not be sent or its response could not be read
    #[error("Token request failed: {0}")]
    Request(#[source] Arc<reqwest::Error>),

    /// The authorization server answered with a non-success status
    #[error("Token endpoint returned HTTP {status}")]
    Status {
        /// HTTP status code returned by the authorization server
        status: u16,
    },

    /// The response body was JSON but carried no usable `access_token`
    #[error("Token response did not contain an access_token")]
    MissingAccessToken,

    /// The response body was not a JSON token response
    #[error("Invalid token response: {message}")]
    InvalidResponse {
        /// Parser or shape error
        message: String,
    },

    /// Invalid client-credentials configuration
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
        /// Setting that caused the failure, if known
        key: Option<String>,
    },
}

impl AuthError {
    /// Create an invalid-response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
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

    /// Create a configuration error naming the offending setting
    pub fn configuration_with_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Whether the failure happened on the wire (timeouts included)
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::Request(_))
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(Arc::new(err))
    }
}
