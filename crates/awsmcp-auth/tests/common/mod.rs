//! Common test utilities for token provider integration tests
//!
//! Wraps a wiremock server that plays the OAuth2 authorization server.

#![allow(dead_code)]

use std::time::Duration;

use awsmcp_auth::{ClientCredentialsConfig, TokenProvider};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const CLIENT_ID: &str = "gateway-client";
pub const CLIENT_SECRET: &str = "gateway-secret";
pub const SCOPE: &str = "gateway/invoke";

/// Mock authorization server exposing `POST /oauth2/token`
pub struct MockAuthorizationServer {
    pub server: MockServer,
    pub token_endpoint: String,
}

impl MockAuthorizationServer {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let token_endpoint = format!("{}/oauth2/token", server.uri());
        Self {
            server,
            token_endpoint,
        }
    }

    /// Token response body as issued by Cognito-style servers
    pub fn token_body(access_token: &str, expires_in: Option<u64>) -> Value {
        let mut body = json!({
            "access_token": access_token,
            "token_type": "Bearer",
        });
        if let Some(expires_in) = expires_in {
            body["expires_in"] = json!(expires_in);
        }
        body
    }

    /// Mount a successful token response expected exactly `times` times
    pub async fn mock_token(&self, access_token: &str, expires_in: Option<u64>, times: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(Self::token_body(access_token, expires_in)),
            )
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Mount a raw response for the token endpoint
    pub async fn mock_response(&self, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the token endpoint has received
    pub async fn token_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }

    pub fn config(&self) -> ClientCredentialsConfig {
        ClientCredentialsConfig::new(
            &self.token_endpoint,
            CLIENT_ID,
            SecretString::from(CLIENT_SECRET.to_string()),
            SCOPE,
        )
        .expect("valid test config")
    }

    pub fn provider(&self) -> TokenProvider {
        TokenProvider::new(self.config()).expect("provider builds")
    }

    pub fn provider_with_timeout(&self, timeout: Duration) -> TokenProvider {
        TokenProvider::new(self.config().with_timeout(timeout)).expect("provider builds")
    }
}
