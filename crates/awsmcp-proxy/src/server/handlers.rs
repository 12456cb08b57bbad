//! HTTP handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde_json::{Value, json};
use tracing::{error, warn};

use super::AppState;
use crate::SERVICE_NAME;
use crate::error::ProxyResult;
use crate::jsonrpc::method_not_allowed;

/// `POST /mcp` - validate, forward, and return the normalized reply
pub async fn mcp_handler(State(state): State<AppState>, body: Bytes) -> ProxyResult<Json<Value>> {
    state
        .forwarder
        .forward_raw(body)
        .await
        .map(Json)
        .inspect_err(|e| {
            if e.is_client_error() {
                warn!(error = %e, "Rejected MCP request");
            }
        })
}

/// `GET /mcp` and `DELETE /mcp`
pub async fn method_not_allowed_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::METHOD_NOT_ALLOWED, Json(method_not_allowed()))
}

/// `GET /` - liveness, no upstream calls
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
    }))
}

/// `GET /health` - readiness, proves a token can be obtained
///
/// A cached token counts as success, so this only reaches the authorization
/// server when the cache is empty or stale.
pub async fn health_handler(State(state): State<AppState>) -> Response {
    match state.tokens.access_token().await {
        Ok(_) => Json(json!({
            "status": "healthy",
            "aws_auth": "ok",
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "detail": "Service unhealthy" })),
            )
                .into_response()
        }
    }
}
