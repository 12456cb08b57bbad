//! awsmcp-proxy: OAuth2-authenticated MCP gateway
//!
//! Sits between an MCP client that speaks plain JSON-RPC over HTTP and a remote
//! MCP server that demands a client-credentials bearer token and may answer
//! with either JSON or an SSE stream.
//!
//! # Quick Start
//!
//! ```bash
//! AWS_AUTH_URL=https://auth.example.com/oauth2/token \
//! AWS_MCP_URL=https://mcp.example.com/mcp \
//! AWS_CLIENT_ID=... AWS_CLIENT_SECRET=... AWS_SCOPE=mcp/invoke \
//!   awsmcp-proxy --port 3000
//! ```
//!
//! # Architecture
//!
//! ```text
//! POST /mcp
//!    │
//!    ▼
//! McpRequest::parse ──(400)──▶ {"detail": ...}
//!    │
//!    ▼
//! UpstreamForwarder::forward
//!    ├── AccessTokenSource::access_token ──(401)
//!    ├── POST upstream ──(504 timeout / upstream status / 500)
//!    └── response::normalize ──(500)
//!    │
//!    ▼
//! one JSON-RPC value
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod forwarder;
pub mod jsonrpc;
pub mod response;
pub mod server;
pub mod sse;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{ProxyError, ProxyResult};

/// Name reported by the liveness endpoint
pub const SERVICE_NAME: &str = "AWS MCP Proxy";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{GatewayConfig, GatewaySettings, ServerConfig, UpstreamConfig};
    pub use crate::error::{ProxyError, ProxyResult, ResponseFormat};
    pub use crate::forwarder::UpstreamForwarder;
    pub use crate::jsonrpc::McpRequest;
    pub use crate::server::{AppState, router};
    pub use awsmcp_auth::{AccessTokenSource, ClientCredentialsConfig, TokenProvider};
}
