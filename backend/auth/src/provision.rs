//! The provisioning handshake: verify a device's signed request against the
//! factory secret and issue it a per-device api key.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{info, warn};

use edgegate_core::{ForbiddenReason, GateError, ProvisionRequest};
use edgegate_keystore::KeyCache;

use crate::sign::{constant_time_eq, generate_api_key, hmac_digest, signing_message};

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

pub struct Provisioner {
    cache: Arc<KeyCache>,
    replay_window_secs: u64,
}

impl Provisioner {
    pub fn new(cache: Arc<KeyCache>, replay_window_secs: u64) -> Self {
        Self {
            cache,
            replay_window_secs,
        }
    }

    /// Verify the signed request and issue a new api key.
    ///
    /// Re-provisioning an already known device silently rotates its key; the
    /// previous key stops authorizing as soon as the map write lands.
    pub async fn provision(&self, req: &ProvisionRequest) -> Result<String, GateError> {
        req.validate()?;
        self.verify(req).await?;

        let api_key = generate_api_key();

        // Whole-map read-modify-write; the lock keeps two concurrent
        // provisions from losing one of the updates.
        let _guard = self.cache.lock_provision().await;
        let mut keys = self.cache.device_keys().await?;
        keys.insert(req.device_id.clone(), api_key.clone());
        self.cache.put_device_keys(keys).await?;

        info!(device_id = %req.device_id, "Provisioned device");
        Ok(api_key)
    }

    /// Replay window and signature checks. Rejections carry a reason for the
    /// server-side log only; callers surface them all as the same Forbidden.
    async fn verify(&self, req: &ProvisionRequest) -> Result<(), GateError> {
        let skew = (now_secs() - req.ts).unsigned_abs();
        if skew > self.replay_window_secs {
            warn!(device_id = %req.device_id, skew_secs = skew, "Stale provisioning request");
            return Err(GateError::forbidden(ForbiddenReason::Stale));
        }

        let secret = self.cache.factory_secret().await?;
        let expected = hmac_digest(
            secret.as_bytes(),
            signing_message(&req.device_id, req.ts).as_bytes(),
        );

        let presented = match hex::decode(&req.sig) {
            Ok(bytes) => bytes,
            Err(_) => {
                warn!(device_id = %req.device_id, "Provisioning signature is not valid hex");
                return Err(GateError::forbidden(ForbiddenReason::BadSignature));
            }
        };

        if !constant_time_eq(&presented, &expected) {
            warn!(device_id = %req.device_id, "Provisioning signature mismatch");
            return Err(GateError::forbidden(ForbiddenReason::BadSignature));
        }

        Ok(())
    }
}
