//! Client-credentials configuration
//!
//! Built once at startup and handed to [`TokenProvider`](crate::TokenProvider)
//! as an immutable value.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::{AuthError, AuthResult};

/// Default timeout for the token request (seconds)
pub const DEFAULT_TOKEN_TIMEOUT_SECS: u64 = 30;

/// Tokens are treated as expired this long before their real expiry (seconds)
pub const DEFAULT_REFRESH_SKEW_SECS: u64 = 60;

/// OAuth2 client-credentials settings for the authorization server
#[derive(Clone)]
pub struct ClientCredentialsConfig {
    /// Token endpoint of the authorization server
    pub token_url: Url,
    /// OAuth2 client identifier
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: SecretString,
    /// Space-delimited scope string sent verbatim
    pub scope: String,
    /// Upper bound for one token request
    pub timeout: Duration,
    /// Safety margin subtracted from the token lifetime
    pub refresh_skew: Duration,
}

impl ClientCredentialsConfig {
    /// Validate and assemble a configuration with default timeout and skew
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if any value is empty or the token
    /// URL does not parse as an absolute `http(s)` URL.
    pub fn new(
        token_url: &str,
        client_id: impl Into<String>,
        client_secret: SecretString,
        scope: impl Into<String>,
    ) -> AuthResult<Self> {
        let client_id = client_id.into();
        let scope = scope.into();

        if client_id.trim().is_empty() {
            return Err(AuthError::configuration_with_key(
                "client id must not be empty",
                "client_id",
            ));
        }
        if client_secret.expose_secret().is_empty() {
            return Err(AuthError::configuration_with_key(
                "client secret must not be empty",
                "client_secret",
            ));
        }
        if scope.trim().is_empty() {
            return Err(AuthError::configuration_with_key(
                "scope must not be empty",
                "scope",
            ));
        }

        Ok(Self {
            token_url: parse_http_url(token_url, "token_url")?,
            client_id,
            client_secret,
            scope,
            timeout: Duration::from_secs(DEFAULT_TOKEN_TIMEOUT_SECS),
            refresh_skew: Duration::from_secs(DEFAULT_REFRESH_SKEW_SECS),
        })
    }

    /// Override the token request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the refresh skew
    #[must_use]
    pub fn with_refresh_skew(mut self, refresh_skew: Duration) -> Self {
        self.refresh_skew = refresh_skew;
        self
    }
}

impl std::fmt::Debug for ClientCredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentialsConfig")
            .field("token_url", &self.token_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .field("refresh_skew", &self.refresh_skew)
            .finish()
    }
}

/// Parse an absolute `http`/`https` URL, naming `key` on failure
///
/// # Errors
///
/// Returns [`AuthError::Configuration`] for empty, relative, or non-HTTP URLs.
pub fn parse_http_url(raw: &str, key: &str) -> AuthResult<Url> {
    if raw.trim().is_empty() {
        return Err(AuthError::configuration_with_key(
            "URL must not be empty",
            key,
        ));
    }

    let url = Url::parse(raw.trim())
        .map_err(|e| AuthError::configuration_with_key(format!("Invalid URL '{raw}': {e}"), key))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AuthError::configuration_with_key(
            format!("Unsupported URL scheme '{other}' (expected http or https)"),
            key,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn test_defaults() {
        let config = ClientCredentialsConfig::new(
            "https://auth.example.com/oauth2/token",
            "client",
            secret("s3cret"),
            "mcp/invoke",
        )
        .unwrap();

        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.refresh_skew, Duration::from_secs(60));
        assert_eq!(config.token_url.path(), "/oauth2/token");
    }

    #[test]
    fn test_rejects_empty_values() {
        let url = "https://auth.example.com/token";
        assert!(ClientCredentialsConfig::new(url, "", secret("s"), "scope").is_err());
        assert!(ClientCredentialsConfig::new(url, "id", secret(""), "scope").is_err());
        assert!(ClientCredentialsConfig::new(url, "id", secret("s"), "  ").is_err());
        assert!(ClientCredentialsConfig::new("", "id", secret("s"), "scope").is_err());
    }

    #[test]
    fn test_rejects_bad_urls() {
        let err = parse_http_url("not a url", "token_url").unwrap_err();
        assert!(matches!(err, AuthError::Configuration { key: Some(ref k), .. } if k == "token_url"));

        assert!(parse_http_url("ftp://auth.example.com/token", "token_url").is_err());
        assert!(parse_http_url("http://localhost:8080/token", "token_url").is_ok());
    }

    #[test]
    fn test_debug_redaction() {
        let config = ClientCredentialsConfig::new(
            "https://auth.example.com/token",
            "client",
            secret("super-secret-value"),
            "scope",
        )
        .unwrap();

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("super-secret-value"));
        assert!(debug_output.contains("<redacted>"));
    }
}
