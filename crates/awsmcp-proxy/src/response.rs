//! Upstream reply normalization
//!
//! Every successful upstream reply collapses into exactly one JSON value:
//! an empty body becomes the null-result envelope, an event stream yields its
//! first JSON `data:` payload, and anything else must be a JSON document.

use serde_json::Value;
use tracing::debug;

use crate::error::{ProxyError, ProxyResult, ResponseFormat};
use crate::jsonrpc::empty_result;
use crate::sse;

/// Media type marking an SSE body
pub const EVENT_STREAM: &str = "text/event-stream";

/// Which decoder a `Content-Type` selects
///
/// A missing or unrecognised content type is treated as JSON.
pub fn response_format(content_type: Option<&str>) -> ResponseFormat {
    match content_type {
        Some(ct) if ct.to_ascii_lowercase().contains(EVENT_STREAM) => ResponseFormat::Sse,
        _ => ResponseFormat::Json,
    }
}

/// Turn an upstream body into a single JSON value
///
/// # Errors
///
/// Returns [`ProxyError::InvalidUpstreamResponse`] if a JSON body does not
/// parse, or an event stream carries no decodable `data:` payload.
pub fn normalize(content_type: Option<&str>, body: &str) -> ProxyResult<Value> {
    let body = body.trim();
    if body.is_empty() {
        debug!("Empty response from upstream (valid for notifications)");
        return Ok(empty_result());
    }

    match response_format(content_type) {
        ResponseFormat::Sse => sse::first_json_event(body).ok_or_else(|| {
            ProxyError::invalid_upstream_response(
                ResponseFormat::Sse,
                "event stream contained no JSON data payload",
            )
        }),
        ResponseFormat::Json => serde_json::from_str(body).map_err(|e| {
            ProxyError::invalid_upstream_response(ResponseFormat::Json, e.to_string())
        }),
    }
}
