//! Structural JSON-RPC checks for inbound MCP requests
//!
//! The gateway does not interpret MCP methods. It only checks that the body is
//! a JSON object carrying `jsonrpc` and `method` keys, then forwards the
//! original bytes untouched.

use bytes::Bytes;
use serde_json::{Value, json};

use crate::error::{ProxyError, ProxyResult};

/// JSON-RPC protocol version emitted by the gateway
pub const JSONRPC_VERSION: &str = "2.0";

/// Server-defined error code used for unsupported HTTP methods on `/mcp`
pub const METHOD_NOT_ALLOWED_CODE: i64 = -32000;

/// An inbound request that passed structural validation
#[derive(Debug, Clone)]
pub struct McpRequest {
    body: Bytes,
    method: String,
    id: Option<Value>,
}

impl McpRequest {
    /// Validate a raw request body
    ///
    /// Key presence is all that is checked; `"jsonrpc": 1` or a non-string
    /// `method` still pass and are left for the upstream to reject.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidRequest`] when the body is empty, is not
    /// JSON, is not an object, or lacks `jsonrpc` or `method`.
    pub fn parse(body: Bytes) -> ProxyResult<Self> {
        if body.is_empty() {
            return Err(ProxyError::invalid_request("Empty request body"));
        }

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| ProxyError::invalid_request(format!("Invalid JSON: {e}")))?;

        let Value::Object(object) = value else {
            return Err(ProxyError::invalid_request("Request must be a JSON object"));
        };

        if !object.contains_key("jsonrpc") {
            return Err(ProxyError::invalid_request("Missing jsonrpc field"));
        }

        let method = match object.get("method") {
            Some(Value::String(name)) => name.clone(),
            Some(other) => other.to_string(),
            None => return Err(ProxyError::invalid_request("Missing method field")),
        };

        Ok(Self {
            id: object.get("id").cloned(),
            method,
            body,
        })
    }

    /// Method name, for logging
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request id, `None` for notifications
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Whether the request carries no `id`
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// The original body bytes
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

/// Envelope returned when the upstream acknowledges with an empty body
pub fn empty_result() -> Value {
    json!({ "jsonrpc": JSONRPC_VERSION, "result": null })
}

/// Error envelope for `GET` and `DELETE` on the MCP endpoint
pub fn method_not_allowed() -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "error": { "code": METHOD_NOT_ALLOWED_CODE, "message": "Method not allowed." },
        "id": null
    })
}
