//! # awsmcp-auth - client-credentials token cache
//!
//! Obtains bearer tokens for the upstream MCP server through the OAuth2
//! client-credentials grant and keeps the current one cached until it is
//! about to expire.
//!
//! ## Architecture
//!
//! - [`config`] - [`ClientCredentialsConfig`], validated once at startup
//! - [`token`] - [`TokenProvider`] and the [`AccessTokenSource`] seam
//! - [`error`] - [`AuthError`] and [`AuthResult`]
//!
//! ## Guarantees
//!
//! - A cached token is reused while `now + refresh_skew < expires_at`
//!   (skew defaults to 60 seconds).
//! - Concurrent cache misses collapse into one token request, and a failed
//!   request is reported to every caller that was waiting on it.
//! - A failed refresh never overwrites the cached entry.
//! - Token values and the client secret are wrapped in
//!   [`secrecy::SecretString`] and never logged.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod token;

pub use config::ClientCredentialsConfig;
pub use error::{AuthError, AuthResult};
pub use token::{AccessTokenSource, CachedToken, TokenProvider};
