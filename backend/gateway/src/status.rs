//! Mapping from the runtime error taxonomy to HTTP responses.
//!
//! Rejections are deliberately coarse: every Forbidden carries the same body
//! regardless of whether the timestamp was stale, the signature wrong, or the
//! key unknown. Internal detail stays in the server-side log, and is redacted
//! first — store and backend error strings can embed key material.

use axum::http::StatusCode;
use tracing::{error, warn};

use edgegate_core::GateError;
use logging::redact_sensitive_data;

/// The detail string that may be logged for an error. Free-form messages
/// (store failures echoing stored values, completion error bodies) pass
/// through redaction before reaching any sink.
pub fn loggable_detail(err: &GateError) -> String {
    let raw = match err {
        GateError::BadRequest(msg) => msg,
        GateError::Forbidden(reason) => return reason.to_string(),
        GateError::NotFound => return "not found".into(),
        GateError::Config(msg) | GateError::Store(msg) | GateError::Completion(msg) => msg,
        GateError::Other(e) => return redact_sensitive_data(&e.to_string()),
    };
    redact_sensitive_data(raw)
}

pub fn to_response(err: &GateError) -> (StatusCode, &'static str) {
    match err {
        GateError::BadRequest(_) => {
            warn!(reason = %loggable_detail(err), "Rejected malformed request");
            (StatusCode::BAD_REQUEST, "BAD REQUEST")
        }
        GateError::Forbidden(_) => {
            warn!(reason = %loggable_detail(err), "Rejected unauthorized request");
            (StatusCode::FORBIDDEN, "FORBIDDEN")
        }
        GateError::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND"),
        GateError::Config(_) => {
            error!(detail = %loggable_detail(err), "Configuration failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL ERROR")
        }
        GateError::Store(_) => {
            error!(detail = %loggable_detail(err), "Secret store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL ERROR")
        }
        GateError::Completion(_) => {
            error!(detail = %loggable_detail(err), "Completion backend failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL ERROR")
        }
        GateError::Other(_) => {
            error!(detail = %loggable_detail(err), "Unexpected failure");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL ERROR")
        }
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 character.
pub fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
