//! Common test utilities for gateway integration tests
//!
//! One wiremock server plays both the authorization server (`/oauth2/token`)
//! and the upstream MCP server (`/mcp`).

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use awsmcp_auth::{AccessTokenSource, AuthResult};
use awsmcp_proxy::config::{GatewayConfig, GatewaySettings};
use awsmcp_proxy::forwarder::UpstreamForwarder;
use awsmcp_proxy::server::{AppState, router};
use axum::Router;
use secrecy::SecretString;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const ACCESS_TOKEN: &str = "upstream-access-token";
pub const TOKEN_PATH: &str = "/oauth2/token";
pub const MCP_PATH: &str = "/mcp";

/// Token source that always returns the same value
#[derive(Debug)]
pub struct StaticToken(pub &'static str);

#[async_trait]
impl AccessTokenSource for StaticToken {
    async fn access_token(&self) -> AuthResult<SecretString> {
        Ok(SecretString::from(self.0.to_string()))
    }
}

/// Mock authorization + MCP server pair
pub struct TestUpstream {
    pub server: MockServer,
}

impl TestUpstream {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn mcp_url(&self) -> String {
        format!("{}{MCP_PATH}", self.server.uri())
    }

    pub fn settings(&self) -> GatewaySettings {
        GatewaySettings {
            auth_url: Some(format!("{}{TOKEN_PATH}", self.server.uri())),
            mcp_url: Some(self.mcp_url()),
            client_id: Some("gateway-client".to_string()),
            client_secret: Some(SecretString::from("gateway-secret".to_string())),
            scope: Some("gateway/invoke".to_string()),
            host: Some("127.0.0.1".to_string()),
            port: Some(0),
            ..GatewaySettings::default()
        }
    }

    pub fn config(&self) -> GatewayConfig {
        GatewayConfig::from_settings(self.settings()).expect("valid test config")
    }

    pub fn config_with_upstream_timeout(&self, timeout: Duration) -> GatewayConfig {
        GatewayConfig::from_settings(GatewaySettings {
            upstream_timeout: Some(timeout),
            ..self.settings()
        })
        .expect("valid test config")
    }

    /// State wired to a real token provider against this mock
    pub fn state(&self) -> AppState {
        AppState::from_config(&self.config()).expect("state builds")
    }

    pub fn forwarder(&self) -> Arc<UpstreamForwarder> {
        self.state().forwarder
    }

    /// Forwarder that skips the token exchange
    pub fn forwarder_with_static_token(&self) -> UpstreamForwarder {
        UpstreamForwarder::new(self.config().upstream, Arc::new(StaticToken(ACCESS_TOKEN)))
            .expect("forwarder builds")
    }

    pub fn router(&self) -> Router {
        router(self.state(), awsmcp_proxy::config::MAX_REQUEST_SIZE)
    }

    /// Mount a token response expected exactly `times` times
    pub async fn mock_token(&self, times: u64) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": ACCESS_TOKEN,
                "token_type": "Bearer",
                "expires_in": 3600,
            })))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mount a raw token endpoint response
    pub async fn mock_token_response(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(TOKEN_PATH))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Mount an MCP endpoint response expected exactly `times` times
    pub async fn mock_mcp(&self, response: ResponseTemplate, times: u64) {
        Mock::given(method("POST"))
            .and(path(MCP_PATH))
            .respond_with(response)
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Requests received on `request_path`
    pub async fn requests_to(&self, request_path: &str) -> Vec<wiremock::Request> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == request_path)
            .collect()
    }
}

/// SSE body carrying one JSON-RPC result
pub fn sse_body(payload: &str) -> String {
    format!("event: message\ndata: {payload}\n\ndata: [DONE]\n")
}

/// Response template with an event-stream content type
pub fn sse_response(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/event-stream")
}

/// A JSON-RPC request body
pub const PING: &str = r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#;
