//! Upstream forwarding
//!
//! [`UpstreamForwarder`] attaches a bearer token to an already-validated MCP
//! request, POSTs the original bytes to the upstream server, and normalizes
//! the reply. It holds no state of its own beyond the HTTP connection pool;
//! token caching lives behind the [`AccessTokenSource`] it is given.

use std::sync::Arc;
use std::time::Duration;

use awsmcp_auth::AccessTokenSource;
use bytes::Bytes;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{Instrument, debug, error, info_span};

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::jsonrpc::McpRequest;
use crate::response;

/// `Accept` header sent upstream
pub const ACCEPT_JSON_OR_SSE: &str = "application/json, text/event-stream";

/// Longest upstream error body written to the log
const MAX_LOGGED_BODY: usize = 512;

/// Forwards MCP requests to the upstream server
///
/// Cheap to share behind an `Arc`; every call is independent.
pub struct UpstreamForwarder {
    client: reqwest::Client,
    config: UpstreamConfig,
    tokens: Arc<dyn AccessTokenSource>,
}

impl std::fmt::Debug for UpstreamForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamForwarder")
            .field("client", &"<reqwest::Client>")
            .field("url", &self.config.url.as_str())
            .field("timeout", &self.config.timeout)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl UpstreamForwarder {
    /// Create a forwarder for `config.url`
    ///
    /// Redirects are not followed; a 3xx reply is reported as an upstream
    /// error like any other status outside 200 and 202.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: UpstreamConfig, tokens: Arc<dyn AccessTokenSource>) -> ProxyResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout)
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Some(Duration::from_secs(90)))
            .build()
            .map_err(|e| ProxyError::configuration(format!("Failed to create HTTP client: {e}")))?;

        debug!(url = %config.url, timeout = ?config.timeout, "Created upstream forwarder");

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    /// Upstream settings this forwarder uses
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Validate a raw inbound body, then forward it
    ///
    /// Validation failures return before any network call, including the
    /// token request.
    ///
    /// # Errors
    ///
    /// Any [`ProxyError`] from validation or [`forward`](Self::forward).
    pub async fn forward_raw(&self, body: Bytes) -> ProxyResult<Value> {
        let request = McpRequest::parse(body)?;
        self.forward(&request).await
    }

    /// Forward a validated request and normalize the reply
    ///
    /// # Errors
    ///
    /// - [`ProxyError::AuthenticationFailed`] if no token could be obtained
    /// - [`ProxyError::UpstreamTimeout`] if the upstream did not answer in time
    /// - [`ProxyError::UpstreamError`] for any status other than 200 or 202
    /// - [`ProxyError::InvalidUpstreamResponse`] for undecodable bodies
    /// - [`ProxyError::Internal`] for other transport failures
    pub async fn forward(&self, request: &McpRequest) -> ProxyResult<Value> {
        let span = info_span!(
            "forward",
            method = %request.method(),
            id = ?request.id(),
        );
        self.forward_inner(request).instrument(span).await
    }

    async fn forward_inner(&self, request: &McpRequest) -> ProxyResult<Value> {
        let token = self.tokens.access_token().await.map_err(|e| {
            error!(error = %e, "Failed to obtain access token");
            ProxyError::AuthenticationFailed(e)
        })?;

        debug!(url = %self.config.url, bytes = request.body().len(), "Forwarding request upstream");

        let response = self
            .client
            .post(self.config.url.clone())
            .bearer_auth(token.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, ACCEPT_JSON_OR_SSE)
            .body(request.body().clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !matches!(status, StatusCode::OK | StatusCode::ACCEPTED) {
            error!(
                status = status.as_u16(),
                body = %truncate(&body, MAX_LOGGED_BODY),
                "Upstream MCP server returned error status"
            );
            return Err(ProxyError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        debug!(
            status = status.as_u16(),
            content_type = content_type.as_deref().unwrap_or(""),
            "Upstream replied"
        );

        response::normalize(content_type.as_deref(), &body).inspect_err(|e| {
            error!(
                error = %e,
                body = %truncate(&body, MAX_LOGGED_BODY),
                "Could not decode upstream reply"
            );
        })
    }

    fn transport_error(&self, err: &reqwest::Error) -> ProxyError {
        if err.is_timeout() {
            error!(timeout = ?self.config.timeout, "Timeout calling upstream MCP server");
            ProxyError::UpstreamTimeout {
                timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            error!(error = %err, "Unexpected error calling upstream MCP server");
            ProxyError::internal(err.to_string())
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use awsmcp_auth::{AuthError, AuthResult};
    use secrecy::SecretString;

    #[derive(Debug)]
    struct Unreachable;

    #[async_trait::async_trait]
    impl AccessTokenSource for Unreachable {
        async fn access_token(&self) -> AuthResult<SecretString> {
            Err(AuthError::MissingAccessToken)
        }
    }

    fn forwarder() -> UpstreamForwarder {
        let config = UpstreamConfig::new("http://127.0.0.1:9/mcp").unwrap();
        UpstreamForwarder::new(config, Arc::new(Unreachable)).unwrap()
    }

    #[tokio::test]
    async fn test_validation_runs_before_authentication() {
        let err = forwarder()
            .forward_raw(Bytes::from_static(br#"{"method":"ping"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::InvalidRequest { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_token_failure_is_authentication_error() {
        let err = forwarder()
            .forward_raw(Bytes::from_static(br#"{"jsonrpc":"2.0","method":"ping","id":1}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::AuthenticationFailed(_)), "got {err:?}");
        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_debug_output() {
        let output = format!("{:?}", forwarder());
        assert!(output.contains("127.0.0.1:9"));
        assert!(output.contains("Unreachable"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("ab", 3), "ab");
    }
}
