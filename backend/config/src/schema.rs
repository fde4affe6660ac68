//! EdgeGate runtime configuration schema.
//!
//! Typed for serde YAML deserialization. All fields carry defaults so a
//! missing config file yields a runnable (if test-only) gateway.

use serde::{Deserialize, Serialize};

/// Root configuration for the EdgeGate gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,

    /// Header carrying the device api key on authorized requests.
    /// Matched case-insensitively, as HTTP headers are.
    pub key_header: String,

    /// Factory secret given directly (takes precedence over the store lookup).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factory_secret: Option<String>,

    /// Store name under which the factory secret lives.
    pub factory_secret_name: String,

    /// Store name under which the device-key map lives.
    pub device_keys_name: String,

    /// Completion model identifier passed through to the backend.
    pub model_id: String,

    /// Completion backend endpoint URL. Empty means "mock".
    pub completion_url: String,

    /// Prompt bytes forwarded to the completion backend, at most.
    pub max_prompt_len: usize,

    /// Response bytes returned to the device, at most.
    pub max_response_len: usize,

    /// Allowed clock skew for signed provisioning requests, seconds.
    pub replay_window_secs: u64,

    /// Timeout for store and completion calls, seconds. No automatic retry.
    pub request_timeout_secs: u64,

    /// Directory holding the file-backed secret store.
    pub state_dir: String,

    /// Default tracing filter when RUST_LOG is unset.
    pub log_level: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".into(),
            key_header: "x-device-key".into(),
            factory_secret: None,
            factory_secret_name: "edgegate/factory-secret".into(),
            device_keys_name: "edgegate/device-keys".into(),
            model_id: "claude-3-haiku".into(),
            completion_url: String::new(),
            max_prompt_len: 512,
            max_response_len: 1500,
            replay_window_secs: 60,
            request_timeout_secs: 10,
            state_dir: "state".into(),
            log_level: "info".into(),
        }
    }
}
