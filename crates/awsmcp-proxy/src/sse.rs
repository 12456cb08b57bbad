//! Minimal SSE scanner for buffered upstream replies
//!
//! The upstream answers a single JSON-RPC request, so the whole event stream
//! is already in memory when we look at it. Only `data: ` lines matter; the
//! first one whose payload decodes as JSON is the reply.

use serde_json::Value;

/// Prefix of a data line, including the single space after the colon
const DATA_PREFIX: &str = "data: ";

/// End-of-stream sentinel some servers emit
const DONE_SENTINEL: &str = "[DONE]";

/// Classification of one SSE line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// `data: <payload>` with a non-empty payload
    Data(&'a str),
    /// `data: [DONE]`
    Done,
    /// Anything else: `event:`, `id:`, comments, blank separators, `data:` with
    /// an empty payload
    Other,
}

impl<'a> SseLine<'a> {
    /// Classify a single line (without its terminator)
    pub fn classify(line: &'a str) -> Self {
        match line.strip_prefix(DATA_PREFIX) {
            Some(DONE_SENTINEL) => Self::Done,
            Some(payload) if !payload.is_empty() => Self::Data(payload),
            _ => Self::Other,
        }
    }
}

/// Return the first `data:` payload that parses as JSON
///
/// Undecodable payloads and `[DONE]` markers are skipped. Returns `None` when
/// the stream holds no JSON payload at all.
pub fn first_json_event(stream: &str) -> Option<Value> {
    stream
        .lines()
        .filter_map(|line| match SseLine::classify(line) {
            SseLine::Data(payload) => Some(payload),
            SseLine::Done | SseLine::Other => None,
        })
        .find_map(|payload| match serde_json::from_str(payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable SSE data line");
                None
            }
        })
}
