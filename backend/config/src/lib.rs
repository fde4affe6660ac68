//! `edgegate-config` — EdgeGate runtime configuration management.
//!
//! Provides:
//! - Typed config schema (gateway, keystore, completion, protocol limits)
//! - YAML read with `${ENV_VAR}` substitution
//! - Default value application and sanity validation

pub mod env;
pub mod schema;

pub use env::{resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use schema::GateConfig;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info};

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<GateConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(GateConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // Parse to a generic tree first so env substitution sees raw `${VAR}` text.
    let value: Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;

    let config: GateConfig = serde_json::from_value(value)
        .with_context(|| format!("Invalid config at: {}", path.display()))?;

    validate(&config)?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Reject configurations that cannot possibly serve traffic.
pub fn validate(config: &GateConfig) -> Result<()> {
    if config.max_prompt_len == 0 || config.max_response_len == 0 {
        bail!("maxPromptLen and maxResponseLen must be non-zero");
    }
    if config.replay_window_secs == 0 {
        bail!("replayWindowSecs must be non-zero");
    }
    if config.key_header.is_empty() {
        bail!("keyHeader must not be empty");
    }
    if config.factory_secret.is_none() && config.factory_secret_name.is_empty() {
        bail!("either factorySecret or factorySecretName must be set");
    }
    Ok(())
}
