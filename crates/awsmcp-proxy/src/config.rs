//! Gateway configuration
//!
//! [`GatewaySettings`] is the loose, as-read form (every field may be missing).
//! [`GatewayConfig::from_settings`] validates it once and produces the
//! immutable values handed to the token provider, the forwarder, and the
//! server.

use std::time::Duration;

use awsmcp_auth::config::parse_http_url;
use awsmcp_auth::{AuthError, ClientCredentialsConfig};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::{ProxyError, ProxyResult};

/// Maximum request size in bytes (10 MB)
pub const MAX_REQUEST_SIZE: usize = 10 * 1024 * 1024;

/// Default upstream timeout (seconds)
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3000;

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Environment variable holding the token endpoint
pub const ENV_AUTH_URL: &str = "AWS_AUTH_URL";
/// Environment variable holding the upstream MCP endpoint
pub const ENV_MCP_URL: &str = "AWS_MCP_URL";
/// Environment variable holding the OAuth2 client id
pub const ENV_CLIENT_ID: &str = "AWS_CLIENT_ID";
/// Environment variable holding the OAuth2 client secret
pub const ENV_CLIENT_SECRET: &str = "AWS_CLIENT_SECRET";
/// Environment variable holding the OAuth2 scope
pub const ENV_SCOPE: &str = "AWS_SCOPE";

/// Settings as collected from flags and environment, before validation
#[derive(Clone, Default)]
pub struct GatewaySettings {
    /// Token endpoint
    pub auth_url: Option<String>,
    /// Upstream MCP endpoint
    pub mcp_url: Option<String>,
    /// OAuth2 client id
    pub client_id: Option<String>,
    /// OAuth2 client secret
    pub client_secret: Option<SecretString>,
    /// OAuth2 scope
    pub scope: Option<String>,
    /// Listen host, defaults to [`DEFAULT_HOST`]
    pub host: Option<String>,
    /// Listen port, defaults to [`DEFAULT_PORT`]
    pub port: Option<u16>,
    /// Upstream timeout, defaults to [`DEFAULT_UPSTREAM_TIMEOUT_SECS`]
    pub upstream_timeout: Option<Duration>,
    /// Token request timeout, defaults to the auth crate's default
    pub auth_timeout: Option<Duration>,
}

impl std::fmt::Debug for GatewaySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewaySettings")
            .field("auth_url", &self.auth_url)
            .field("mcp_url", &self.mcp_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("scope", &self.scope)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("auth_timeout", &self.auth_timeout)
            .finish()
    }
}

/// Upstream MCP server settings
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Endpoint every request is POSTed to
    pub url: Url,
    /// Deadline for one upstream call, including reading the body
    pub timeout: Duration,
}

impl UpstreamConfig {
    /// Validate the URL and use the default timeout
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Configuration`] if `url` is not an absolute
    /// `http(s)` URL.
    pub fn new(url: &str) -> ProxyResult<Self> {
        Ok(Self {
            url: parse_http_url(url, ENV_MCP_URL).map_err(configuration_error)?,
            timeout: Duration::from_secs(DEFAULT_UPSTREAM_TIMEOUT_SECS),
        })
    }

    /// Override the upstream timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Listener settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host or IP to bind
    pub host: String,
    /// Port to bind
    pub port: u16,
    /// Largest accepted request body in bytes
    pub max_body_size: usize,
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_body_size: MAX_REQUEST_SIZE,
        }
    }
}

/// Validated gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Token exchange settings
    pub credentials: ClientCredentialsConfig,
    /// Upstream MCP server settings
    pub upstream: UpstreamConfig,
    /// Listener settings
    pub server: ServerConfig,
}

impl GatewayConfig {
    /// Validate collected settings
    ///
    /// All five required settings are checked before anything else so the
    /// error names every missing variable at once.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Configuration`] if a required setting is absent
    /// or empty, or a URL is invalid.
    pub fn from_settings(settings: GatewaySettings) -> ProxyResult<Self> {
        let GatewaySettings {
            auth_url,
            mcp_url,
            client_id,
            client_secret,
            scope,
            host,
            port,
            upstream_timeout,
            auth_timeout,
        } = settings;

        let auth_url = non_empty(auth_url);
        let mcp_url = non_empty(mcp_url);
        let client_id = non_empty(client_id);
        let scope = non_empty(scope);
        let client_secret = client_secret.filter(|s| !s.expose_secret().trim().is_empty());

        let missing: Vec<&str> = [
            (ENV_AUTH_URL, auth_url.is_none()),
            (ENV_MCP_URL, mcp_url.is_none()),
            (ENV_CLIENT_ID, client_id.is_none()),
            (ENV_CLIENT_SECRET, client_secret.is_none()),
            (ENV_SCOPE, scope.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        let (Some(auth_url), Some(mcp_url), Some(client_id), Some(client_secret), Some(scope)) =
            (auth_url, mcp_url, client_id, client_secret, scope)
        else {
            return Err(ProxyError::configuration(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let mut credentials =
            ClientCredentialsConfig::new(&auth_url, client_id, client_secret, scope)
                .map_err(configuration_error)?;
        if let Some(timeout) = auth_timeout {
            credentials = credentials.with_timeout(timeout);
        }

        let mut upstream = UpstreamConfig::new(&mcp_url)?;
        if let Some(timeout) = upstream_timeout {
            upstream = upstream.with_timeout(timeout);
        }

        let server = ServerConfig {
            host: non_empty(host).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port.unwrap_or(DEFAULT_PORT),
            max_body_size: MAX_REQUEST_SIZE,
        };

        Ok(Self {
            credentials,
            upstream,
            server,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Re-key auth-side configuration errors as gateway configuration errors
fn configuration_error(err: AuthError) -> ProxyError {
    match err {
        AuthError::Configuration {
            message,
            key: Some(key),
        } => ProxyError::configuration_with_key(message, env_name(&key)),
        other => ProxyError::configuration(other.to_string()),
    }
}

fn env_name(key: &str) -> &str {
    match key {
        "token_url" => ENV_AUTH_URL,
        "client_id" => ENV_CLIENT_ID,
        "client_secret" => ENV_CLIENT_SECRET,
        "scope" => ENV_SCOPE,
        other => other,
    }
}
