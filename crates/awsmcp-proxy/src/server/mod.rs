//! Inbound HTTP surface
//!
//! ```text
//! POST   /mcp     forward JSON-RPC request upstream
//! GET    /mcp     405 JSON-RPC error
//! DELETE /mcp     405 JSON-RPC error
//! GET    /        liveness
//! GET    /health  readiness (token fetch)
//! ```

pub mod handlers;

use std::sync::Arc;

use awsmcp_auth::{AccessTokenSource, TokenProvider};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::forwarder::UpstreamForwarder;

/// Shared handler state
#[derive(Clone, Debug)]
pub struct AppState {
    /// Forwards `/mcp` requests
    pub forwarder: Arc<UpstreamForwarder>,
    /// Token source checked by `/health`; the same one the forwarder uses
    pub tokens: Arc<dyn AccessTokenSource>,
}

impl AppState {
    /// Bundle a forwarder with the token source it was built from
    pub fn new(forwarder: Arc<UpstreamForwarder>, tokens: Arc<dyn AccessTokenSource>) -> Self {
        Self { forwarder, tokens }
    }

    /// Build the token provider and forwarder from validated configuration
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Configuration`] if an HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> ProxyResult<Self> {
        let provider = TokenProvider::new(config.credentials.clone())
            .map_err(|e| ProxyError::configuration(e.to_string()))?;
        let tokens: Arc<dyn AccessTokenSource> = Arc::new(provider);
        let forwarder = UpstreamForwarder::new(config.upstream.clone(), Arc::clone(&tokens))?;

        Ok(Self::new(Arc::new(forwarder), tokens))
    }
}

/// Build the router with CORS, body limit, and request tracing layers
pub fn router(state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route(
            "/mcp",
            post(handlers::mcp_handler)
                .get(handlers::method_not_allowed_handler)
                .delete(handlers::method_not_allowed_handler),
        )
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Any origin, any header, `GET`/`POST`/`DELETE`
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any)
}

/// Bind, serve until Ctrl-C or SIGTERM, then drain in-flight requests
///
/// # Errors
///
/// Returns [`ProxyError::Io`] if the listener cannot be bound or the server
/// fails, or a configuration error from [`AppState::from_config`].
pub async fn run(config: GatewayConfig) -> ProxyResult<()> {
    let state = AppState::from_config(&config)?;
    let app = router(state, config.server.max_body_size);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(upstream = %config.upstream.url, "Gateway listening on http://{}", addr);
    info!("Endpoints:");
    info!("  POST   /mcp      - JSON-RPC forwarding");
    info!("  GET    /         - Liveness");
    info!("  GET    /health   - Readiness (token fetch)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Gateway shut down cleanly");
    Ok(())
}

/// Resolve on Ctrl-C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
