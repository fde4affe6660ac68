//! Structured logging for the EdgeGate runtime.
//!
//! Handles subscriber setup (console + rolling JSON file) and redaction of
//! key material before anything reaches a log sink.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
