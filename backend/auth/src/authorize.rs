//! The request-authorization check gating the completion pathway.

use std::sync::Arc;

use edgegate_core::GateError;
use edgegate_keystore::KeyCache;

pub struct Authorizer {
    cache: Arc<KeyCache>,
}

impl Authorizer {
    pub fn new(cache: Arc<KeyCache>) -> Self {
        Self { cache }
    }

    /// True when the presented key equals the api key of some provisioned
    /// device. A membership test over values: the check establishes that a
    /// valid key was presented, not which device presented it.
    pub async fn authorize(&self, presented: Option<&str>) -> Result<bool, GateError> {
        let Some(key) = presented.filter(|k| !k.is_empty()) else {
            return Ok(false);
        };
        let keys = self.cache.device_keys().await?;
        Ok(keys.values().any(|issued| issued == key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provision::Provisioner;
    use crate::sign::sign_hex;
    use anyhow::Result;
    use async_trait::async_trait;
    use edgegate_core::{ProvisionRequest, SecretStore};
    use edgegate_keystore::MemoryStore;
    use std::time::{SystemTime, UNIX_EPOCH};

    const FACTORY_SECRET: &str = "s3cr3t";

    fn now() -> i64 {
        SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() as i64
    }

    fn cache() -> Arc<KeyCache> {
        Arc::new(KeyCache::new(
            Arc::new(MemoryStore::new()),
            Some(FACTORY_SECRET.into()),
            "factory",
            "keys",
        ))
    }

    fn signed_request(device_id: &str, ts: i64) -> ProvisionRequest {
        ProvisionRequest {
            device_id: device_id.into(),
            ts,
            sig: sign_hex(FACTORY_SECRET.as_bytes(), device_id, ts),
        }
    }

    #[tokio::test]
    async fn valid_handshake_issues_32_hex_key() {
        let cache = cache();
        let provisioner = Provisioner::new(cache.clone(), 60);

        let key = provisioner.provision(&signed_request("dev-1", now())).await.unwrap();
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn stale_timestamp_is_forbidden_even_with_valid_signature() {
        let cache = cache();
        let provisioner = Provisioner::new(cache, 60);

        for ts in [now() - 120, now() + 120] {
            let err = provisioner.provision(&signed_request("dev-1", ts)).await.unwrap_err();
            assert!(matches!(
                err,
                GateError::Forbidden(edgegate_core::ForbiddenReason::Stale)
            ));
        }
    }

    #[tokio::test]
    async fn negative_timestamp_is_stale_not_malformed() {
        let cache = cache();
        let provisioner = Provisioner::new(cache, 60);

        // An ancient (pre-epoch) timestamp is present, just hopeless: it
        // fails the replay window, not the presence check.
        let err = provisioner.provision(&signed_request("dev-1", -1)).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::Forbidden(edgegate_core::ForbiddenReason::Stale)
        ));
    }

    #[tokio::test]
    async fn boundary_skew_is_accepted() {
        let cache = cache();
        let provisioner = Provisioner::new(cache, 60);
        // 59s in the past stays inside the window even after a second of
        // test-execution drift.
        assert!(provisioner.provision(&signed_request("dev-1", now() - 59)).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_signature_is_forbidden() {
        let cache = cache();
        let provisioner = Provisioner::new(cache, 60);

        let ts = now();
        let mut req = signed_request("dev-1", ts);
        req.sig = sign_hex(b"wrong-secret", "dev-1", ts);
        let err = provisioner.provision(&req).await.unwrap_err();
        assert!(matches!(
            err,
            GateError::Forbidden(edgegate_core::ForbiddenReason::BadSignature)
        ));
    }

    #[tokio::test]
    async fn non_hex_signature_is_forbidden() {
        let cache = cache();
        let provisioner = Provisioner::new(cache, 60);

        let mut req = signed_request("dev-1", now());
        req.sig = "zz-not-hex".into();
        assert!(matches!(
            provisioner.provision(&req).await,
            Err(GateError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let cache = cache();
        let provisioner = Provisioner::new(cache, 60);

        let req = ProvisionRequest {
            device_id: String::new(),
            ts: now(),
            sig: "aa".into(),
        };
        assert!(matches!(
            provisioner.provision(&req).await,
            Err(GateError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn issued_key_authorizes_and_unknown_key_does_not() {
        let cache = cache();
        let provisioner = Provisioner::new(cache.clone(), 60);
        let authorizer = Authorizer::new(cache);

        let key = provisioner.provision(&signed_request("dev-1", now())).await.unwrap();

        assert!(authorizer.authorize(Some(&key)).await.unwrap());
        assert!(!authorizer.authorize(Some("not-a-real-key")).await.unwrap());
        assert!(!authorizer.authorize(None).await.unwrap());
        assert!(!authorizer.authorize(Some("")).await.unwrap());
    }

    #[tokio::test]
    async fn reprovision_rotates_the_key() {
        let cache = cache();
        let provisioner = Provisioner::new(cache.clone(), 60);
        let authorizer = Authorizer::new(cache);

        let first = provisioner.provision(&signed_request("dev-1", now())).await.unwrap();
        let second = provisioner.provision(&signed_request("dev-1", now())).await.unwrap();

        // Not idempotent: each successful handshake mints a fresh key.
        assert_ne!(first, second);
        assert!(!authorizer.authorize(Some(&first)).await.unwrap());
        assert!(authorizer.authorize(Some(&second)).await.unwrap());
    }

    #[tokio::test]
    async fn provisioning_different_devices_keeps_both_keys() {
        let cache = cache();
        let provisioner = Provisioner::new(cache.clone(), 60);
        let authorizer = Authorizer::new(cache);

        let k1 = provisioner.provision(&signed_request("dev-1", now())).await.unwrap();
        let k2 = provisioner.provision(&signed_request("dev-2", now())).await.unwrap();

        assert!(authorizer.authorize(Some(&k1)).await.unwrap());
        assert!(authorizer.authorize(Some(&k2)).await.unwrap());
    }

    #[tokio::test]
    async fn concurrent_provisions_do_not_lose_updates() {
        let cache = cache();
        let p1 = Arc::new(Provisioner::new(cache.clone(), 60));
        let p2 = p1.clone();

        let ts = now();
        let (r1, r2) = tokio::join!(
            {
                let p = p1.clone();
                async move { p.provision(&signed_request("dev-a", ts)).await }
            },
            {
                let p = p2.clone();
                async move { p.provision(&signed_request("dev-b", ts)).await }
            }
        );
        r1.unwrap();
        r2.unwrap();

        let keys = cache.device_keys().await.unwrap();
        assert!(keys.contains_key("dev-a"));
        assert!(keys.contains_key("dev-b"));
    }

    /// A store whose writes always fail, for the StoreUnavailable path.
    struct BrokenStore;

    #[async_trait]
    impl SecretStore for BrokenStore {
        async fn get(&self, _name: &str) -> Result<Option<String>> {
            Ok(Some("{}".into()))
        }
        async fn put(&self, _name: &str, _value: &str) -> Result<()> {
            anyhow::bail!("store unavailable")
        }
    }

    #[tokio::test]
    async fn store_write_failure_surfaces_as_store_error() {
        let cache = Arc::new(KeyCache::new(
            Arc::new(BrokenStore),
            Some(FACTORY_SECRET.into()),
            "factory",
            "keys",
        ));
        let provisioner = Provisioner::new(cache, 60);

        let err = provisioner.provision(&signed_request("dev-1", now())).await.unwrap_err();
        assert!(matches!(err, GateError::Store(_)));
    }
}
