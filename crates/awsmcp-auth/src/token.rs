//! Cached client-credentials access token
//!
//! [`TokenProvider`] owns exactly one [`CachedToken`]. Reads go through an
//! `RwLock` so the common cache-hit path never contends with other readers;
//! refreshes are serialized by a separate `Mutex` and the cache is re-checked
//! after acquiring it, so a burst of callers that all miss at once produces a
//! single request to the authorization server. The outcome of a refresh is
//! shared with everyone who queued behind it: if it fails, the waiters get the
//! same error instead of each retrying the exchange in turn.
//!
//! The value and its expiry are stored together and replaced in one write, so
//! readers never see a token paired with another token's expiry. A failed
//! refresh leaves the previous entry untouched.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Number;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info, warn};

use crate::config::ClientCredentialsConfig;
use crate::error::{AuthError, AuthResult};

/// Lifetime assumed when the token response omits `expires_in` (seconds)
pub const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

/// Upper bound on a token lifetime we are willing to trust (one year)
const MAX_EXPIRES_IN_SECS: u64 = 366 * 24 * 60 * 60;

/// Longest error body kept in logs
const MAX_LOGGED_BODY: usize = 256;

/// A bearer token and the instant it stops being valid
#[derive(Clone)]
pub struct CachedToken {
    value: SecretString,
    expires_at: Instant,
}

impl CachedToken {
    /// Create a token that expires `expires_in` from now
    pub fn new(value: SecretString, expires_in: Duration) -> Self {
        Self::issued_at(value, Instant::now(), expires_in)
    }

    /// Create a token whose lifetime is counted from `issued`
    ///
    /// Pass the instant the token request was sent so time spent waiting on
    /// the authorization server comes out of the lifetime, not the skew.
    pub fn issued_at(value: SecretString, issued: Instant, expires_in: Duration) -> Self {
        let expires_in = expires_in.min(Duration::from_secs(MAX_EXPIRES_IN_SECS));
        Self {
            value,
            expires_at: issued + expires_in,
        }
    }

    /// Whether the token outlives `now + skew`
    pub fn is_fresh(&self, skew: Duration) -> bool {
        Instant::now() + skew < self.expires_at
    }

    /// Remaining lifetime, zero once expired
    pub fn time_to_expiry(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// The bearer value
    pub fn value(&self) -> &SecretString {
        &self.value
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("value", &"<redacted>")
            .field("time_to_expiry", &self.time_to_expiry())
            .finish()
    }
}

/// Anything that can hand out a bearer token for the upstream server
#[async_trait]
pub trait AccessTokenSource: Send + Sync + std::fmt::Debug {
    /// Return a token that is valid for at least the next request
    async fn access_token(&self) -> AuthResult<SecretString>;
}

/// JSON body returned by the token endpoint
///
/// Only the two fields we use are declared; everything else (`token_type`,
/// `scope`, ...) is ignored. `expires_in` may be any JSON number.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<Number>,
}

/// Whole seconds in an `expires_in` value, negatives read as zero
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lifetime_secs(expires_in: &Number) -> u64 {
    expires_in.as_u64().unwrap_or_else(|| {
        expires_in
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map_or(0, |secs| secs as u64)
    })
}

/// Bookkeeping guarded by the refresh lock
#[derive(Debug, Default)]
struct RefreshState {
    /// Number of completed refresh attempts
    generation: u64,
    /// Error of the latest attempt, cleared on success
    last_failure: Option<AuthError>,
}

/// Client-credentials token cache with single-flight refresh
///
/// Cloning is cheap and every clone shares the same cache.
///
/// # Example
///
/// ```rust,no_run
/// # use awsmcp_auth::{ClientCredentialsConfig, TokenProvider};
/// # use secrecy::{ExposeSecret, SecretString};
/// # async fn example() -> awsmcp_auth::AuthResult<()> {
/// let config = ClientCredentialsConfig::new(
///     "https://auth.example.com/oauth2/token",
///     "my-client",
///     SecretString::from("my-secret".to_string()),
///     "mcp/invoke",
/// )?;
/// let provider = TokenProvider::new(config)?;
///
/// let token = provider.get_token().await?;
/// assert!(!token.expose_secret().is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct TokenProvider {
    config: Arc<ClientCredentialsConfig>,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedToken>>>,
    refresh: Arc<Mutex<RefreshState>>,
    generation: Arc<AtomicU64>,
}

impl TokenProvider {
    /// Create a provider with an empty cache
    ///
    /// The HTTP client never follows redirects and applies the configured
    /// timeout to every token request.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Configuration`] if the HTTP client cannot be built.
    pub fn new(config: ClientCredentialsConfig) -> AuthResult<Self> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(config.timeout)
            .build()
            .map_err(|e| AuthError::configuration(format!("Failed to create HTTP client: {e}")))?;

        debug!(token_url = %config.token_url, "Created token provider");

        Ok(Self {
            config: Arc::new(config),
            http_client,
            cache: Arc::new(RwLock::new(None)),
            refresh: Arc::new(Mutex::new(RefreshState::default())),
            generation: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Return the cached token, refreshing it first if it is missing or
    /// within the refresh skew of expiry
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if a refresh was needed and the token request
    /// failed, returned a non-success status, or carried no `access_token`.
    /// The cache is not modified in that case, and callers that were waiting
    /// on that refresh receive the same error.
    pub async fn get_token(&self) -> AuthResult<SecretString> {
        if let Some(token) = self.fresh_cached().await {
            debug!("Using cached access token");
            return Ok(token);
        }

        let observed = self.generation.load(Ordering::Acquire);
        let mut refresh = self.refresh.lock().await;

        // Whoever held the lock before us may already have refreshed.
        if let Some(token) = self.fresh_cached().await {
            debug!("Access token refreshed by a concurrent caller");
            return Ok(token);
        }

        // An attempt completed while we were queued and it failed.
        if refresh.generation != observed
            && let Some(err) = &refresh.last_failure
        {
            debug!(error = %err, "Concurrent token refresh failed");
            return Err(err.clone());
        }

        let outcome = self.request_token().await;
        refresh.generation += 1;
        self.generation.store(refresh.generation, Ordering::Release);

        match outcome {
            Ok(fresh) => {
                let value = fresh.value.clone();
                *self.cache.write().await = Some(fresh);
                refresh.last_failure = None;
                Ok(value)
            }
            Err(err) => {
                refresh.last_failure = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Remaining lifetime of the cached token, `None` before the first fetch
    pub async fn time_to_expiry(&self) -> Option<Duration> {
        self.cache.read().await.as_ref().map(CachedToken::time_to_expiry)
    }

    /// Configuration this provider was built with
    pub fn config(&self) -> &ClientCredentialsConfig {
        &self.config
    }

    async fn fresh_cached(&self) -> Option<SecretString> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|token| token.is_fresh(self.config.refresh_skew))
            .map(|token| token.value.clone())
    }

    /// Perform one client-credentials exchange
    async fn request_token(&self) -> AuthResult<CachedToken> {
        let token_url = &self.config.token_url;
        info!(%token_url, "Requesting access token");

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret()),
            ("scope", self.config.scope.as_str()),
        ];

        let issued = Instant::now();
        let response = self
            .http_client
            .post(token_url.clone())
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                error!(%token_url, error = %e, "Failed to get access token");
                AuthError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                %token_url,
                status = status.as_u16(),
                body = %truncate(&body, MAX_LOGGED_BODY),
                "Token endpoint returned error status"
            );
            return Err(AuthError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| {
            error!(%token_url, error = %e, "Failed to read token response");
            AuthError::from(e)
        })?;

        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            error!(%token_url, error = %e, "Token response is not valid JSON");
            AuthError::invalid_response(e.to_string())
        })?;

        let access_token = parsed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                error!(%token_url, "Token response did not contain an access_token");
                AuthError::MissingAccessToken
            })?;

        let expires_in = parsed.expires_in.as_ref().map_or_else(
            || {
                debug!("Token response has no expires_in, assuming {DEFAULT_EXPIRES_IN_SECS}s");
                DEFAULT_EXPIRES_IN_SECS
            },
            lifetime_secs,
        );

        if Duration::from_secs(expires_in) <= self.config.refresh_skew {
            warn!(
                expires_in_secs = expires_in,
                "Token lifetime is shorter than the refresh skew; it will be refreshed on every call"
            );
        }

        info!(expires_in_secs = expires_in, "Access token refreshed successfully");

        Ok(CachedToken::issued_at(
            SecretString::from(access_token),
            issued,
            Duration::from_secs(expires_in),
        ))
    }
}

impl std::fmt::Debug for TokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenProvider")
            .field("config", &self.config)
            .field("http_client", &"<reqwest::Client>")
            .field("cache", &"<RwLock>")
            .finish()
    }
}

#[async_trait]
impl AccessTokenSource for TokenProvider {
    async fn access_token(&self) -> AuthResult<SecretString> {
        self.get_token().await
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

    fn token(value: &str, secs: u64) -> CachedToken {
        CachedToken::new(SecretString::from(value.to_string()), Duration::from_secs(secs))
    }

    #[test]
    fn test_fresh_outside_skew() {
        let cached = token("abc", 3600);
        assert!(cached.is_fresh(Duration::from_secs(60)));
    }

    #[test]
    fn test_stale_inside_skew() {
        // Still technically valid, but inside the 60s safety margin
        let cached = token("abc", 30);
        assert!(!cached.is_fresh(Duration::from_secs(60)));
        assert!(cached.is_fresh(Duration::ZERO));
    }

    #[test]
    fn test_expired_token() {
        let cached = token("abc", 0);
        assert!(!cached.is_fresh(Duration::ZERO));
        assert_eq!(cached.time_to_expiry(), Duration::ZERO);
    }

    #[test]
    fn test_lifetime_is_clamped() {
        let cached = token("abc", u64::MAX);
        assert!(cached.time_to_expiry() <= Duration::from_secs(MAX_EXPIRES_IN_SECS));
    }

    #[test]
    fn test_cached_token_debug_redaction() {
        let cached = token("bearer-value-123", 3600);
        let debug_output = format!("{cached:?}");
        assert!(!debug_output.contains("bearer-value-123"));
        assert!(debug_output.contains("<redacted>"));
    }

    #[test]
    fn test_token_response_parsing() {
        let parsed: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"Bearer","expires_in":900}"#,
        )
        .unwrap();
        assert_eq!(parsed.access_token.as_deref(), Some("abc"));
        assert_eq!(parsed.expires_in.as_ref().map(lifetime_secs), Some(900));

        let parsed: TokenResponse = serde_json::from_str(r#"{"token_type":"Bearer"}"#).unwrap();
        assert!(parsed.access_token.is_none());
        assert!(parsed.expires_in.is_none());
    }

    #[test]
    fn test_fractional_and_negative_lifetimes() {
        let secs = |raw: &str| lifetime_secs(&serde_json::from_str::<Number>(raw).unwrap());
        assert_eq!(secs("3600"), 3600);
        assert_eq!(secs("3600.0"), 3600);
        assert_eq!(secs("59.9"), 59);
        assert_eq!(secs("-5"), 0);
    }

    #[test]
    fn test_lifetime_counts_from_issue_time() {
        let issued = Instant::now().checked_sub(Duration::from_secs(30)).unwrap();
        let cached = CachedToken::issued_at(
            SecretString::from("abc".to_string()),
            issued,
            Duration::from_secs(80),
        );
        // 50s left, inside the 60s skew
        assert!(!cached.is_fresh(Duration::from_secs(60)));
        assert!(cached.time_to_expiry() <= Duration::from_secs(50));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello", 2), "he");
        assert_eq!(truncate("héllo", 2), "hé");
    }
}
