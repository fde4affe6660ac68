use thiserror::Error;

/// Why an authentication or authorization check failed.
///
/// Logged server-side only. Every variant surfaces to the caller as the same
/// coarse `Forbidden` response so that rejection cannot be used as an oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForbiddenReason {
    /// Timestamp outside the replay window.
    Stale,
    /// Signature failed hex decoding or HMAC verification.
    BadSignature,
    /// Presented key matches no issued device key.
    UnknownKey,
    /// No key header present at all.
    MissingKey,
}

impl std::fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ForbiddenReason::Stale => "stale timestamp",
            ForbiddenReason::BadSignature => "invalid signature",
            ForbiddenReason::UnknownKey => "unknown device key",
            ForbiddenReason::MissingKey => "missing device key",
        };
        f.write_str(s)
    }
}

/// Top-level error type for the EdgeGate runtime.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("forbidden: {0}")]
    Forbidden(ForbiddenReason),

    #[error("not found")]
    NotFound,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("secret store error: {0}")]
    Store(String),

    #[error("completion backend error: {0}")]
    Completion(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl GateError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        GateError::BadRequest(msg.into())
    }

    pub fn forbidden(reason: ForbiddenReason) -> Self {
        GateError::Forbidden(reason)
    }
}
