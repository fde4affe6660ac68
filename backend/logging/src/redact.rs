//! Log Redaction Layer
//!
//! Scrubs device api keys and request signatures from strings prior to
//! logging. Issued keys are 32 hex chars and HMAC signatures 64, so any long
//! bare hex run is treated as key material.

use regex::Regex;
use std::sync::LazyLock;

static HEX_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9a-fA-F]{32,64}\b").unwrap());
static KEY_HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(x-device-key:\s*)\S+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = HEX_TOKEN_RE.replace_all(input, "[REDACTED_KEY]");
    KEY_HEADER_RE.replace_all(&redacted, "$1[REDACTED_KEY]").to_string()
}
