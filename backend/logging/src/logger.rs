//! Tracing subscriber setup for the gateway process.
//!
//! Two sinks: a human-readable console layer and a daily-rotated NDJSON file
//! under `<state_dir>/logs/`, next to the file-backed secret store so one
//! directory holds everything the process persists. `RUST_LOG` overrides the
//! configured level.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "edgegate.ndjson";

/// Initialize the global subscriber. Safe to call more than once; only the
/// first call wins.
pub fn init_logger(state_dir: impl AsRef<Path>, level: &str) {
    let log_dir = state_dir.as_ref().join("logs");

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = fmt::layer()
        .json()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX))
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_does_not_panic() {
        let dir = std::env::temp_dir().join("edgegate-logger-test");
        init_logger(&dir, "info");
        init_logger(&dir, "debug");
    }
}
