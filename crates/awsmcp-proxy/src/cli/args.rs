//! Gateway arguments
//!
//! Every flag falls back to an environment variable, so the gateway can run
//! from a `.env` file alone.

use std::time::Duration;

use clap::Args;
use secrecy::SecretString;

use crate::config::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_UPSTREAM_TIMEOUT_SECS, ENV_AUTH_URL, ENV_CLIENT_ID,
    ENV_CLIENT_SECRET, ENV_MCP_URL, ENV_SCOPE, GatewaySettings,
};

/// Upstream, credential, and listener settings
#[derive(Args, Clone)]
pub struct GatewayArgs {
    /// OAuth2 token endpoint of the authorization server
    #[arg(long, env = ENV_AUTH_URL, value_name = "URL")]
    pub auth_url: Option<String>,

    /// Upstream MCP endpoint requests are forwarded to
    #[arg(long, env = ENV_MCP_URL, value_name = "URL")]
    pub mcp_url: Option<String>,

    /// OAuth2 client id
    #[arg(long, env = ENV_CLIENT_ID, value_name = "ID")]
    pub client_id: Option<String>,

    /// OAuth2 client secret
    #[arg(long, env = ENV_CLIENT_SECRET, value_name = "SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// OAuth2 scope
    #[arg(long, env = ENV_SCOPE, value_name = "SCOPE")]
    pub scope: Option<String>,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Upstream request timeout in seconds
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", value_name = "SECS", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout_secs: u64,

    /// Token request timeout in seconds
    #[arg(long, env = "AUTH_TIMEOUT_SECS", value_name = "SECS", default_value_t = awsmcp_auth::config::DEFAULT_TOKEN_TIMEOUT_SECS)]
    pub auth_timeout_secs: u64,
}

impl GatewayArgs {
    /// Convert into unvalidated gateway settings
    pub fn into_settings(self) -> GatewaySettings {
        GatewaySettings {
            auth_url: self.auth_url,
            mcp_url: self.mcp_url,
            client_id: self.client_id,
            client_secret: self.client_secret.map(SecretString::from),
            scope: self.scope,
            host: Some(self.host),
            port: Some(self.port),
            upstream_timeout: Some(Duration::from_secs(self.upstream_timeout_secs)),
            auth_timeout: Some(Duration::from_secs(self.auth_timeout_secs)),
        }
    }
}

impl std::fmt::Debug for GatewayArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayArgs")
            .field("auth_url", &self.auth_url)
            .field("mcp_url", &self.mcp_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("auth_timeout_secs", &self.auth_timeout_secs)
            .finish()
    }
}
