use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::GateError;

/// The device-key mapping: device_id → issued api key.
///
/// The authoritative copy lives in the secret store; the in-process cache is a
/// possibly-stale read replica.
pub type DeviceKeyMap = HashMap<String, String>;

/// Payload of a provisioning call. Transient; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionRequest {
    /// Externally assigned device identifier.
    pub device_id: String,
    /// Unix seconds at which the device signed the request.
    pub ts: i64,
    /// Hex-encoded HMAC-SHA256 over `"{device_id}:{ts}"`.
    pub sig: String,
}

impl ProvisionRequest {
    /// Reject requests with missing or empty fields before any crypto work.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.device_id.is_empty() {
            return Err(GateError::bad_request("missing device_id"));
        }
        // Only an absent (zero) timestamp is a malformed request; out-of-range
        // values are present and get rejected by the replay-window check.
        if self.ts == 0 {
            return Err(GateError::bad_request("missing ts"));
        }
        if self.sig.is_empty() {
            return Err(GateError::bad_request("missing sig"));
        }
        Ok(())
    }
}
