//! In-process mirror of the factory secret and device-key map.
//!
//! Lazily populated from the secret store; the store stays authoritative and
//! the cache is a possibly-stale read replica. Provisioning writes go through
//! `put_device_keys`, which replaces the stored value and then the cached one.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

use edgegate_core::{DeviceKeyMap, GateError, SecretStore};

pub struct KeyCache {
    store: Arc<dyn SecretStore>,
    /// Factory secret given directly in config; wins over the store lookup.
    direct_factory_secret: Option<String>,
    factory_secret_name: String,
    device_keys_name: String,

    factory_secret: RwLock<Option<String>>,
    device_keys: RwLock<DeviceKeyMap>,
    /// Times the stored device-key map failed to parse and was served empty.
    parse_failures: AtomicU64,
    /// Serializes the provisioning read-modify-write sequence. Without it,
    /// two concurrent provisions interleave and one whole-map write is lost.
    provision_lock: Mutex<()>,
}

impl KeyCache {
    pub fn new(
        store: Arc<dyn SecretStore>,
        direct_factory_secret: Option<String>,
        factory_secret_name: impl Into<String>,
        device_keys_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            direct_factory_secret: direct_factory_secret.filter(|s| !s.is_empty()),
            factory_secret_name: factory_secret_name.into(),
            device_keys_name: device_keys_name.into(),
            factory_secret: RwLock::new(None),
            device_keys: RwLock::new(DeviceKeyMap::new()),
            parse_failures: AtomicU64::new(0),
            provision_lock: Mutex::new(()),
        }
    }

    /// The factory secret, loaded once per process.
    ///
    /// Resolution order: cached value, direct config value, store lookup by
    /// configured name. A missing name or an empty stored value is fatal for
    /// the calling request.
    pub async fn factory_secret(&self) -> Result<String, GateError> {
        if let Some(cached) = self.factory_secret.read().await.as_ref() {
            return Ok(cached.clone());
        }

        if let Some(direct) = &self.direct_factory_secret {
            *self.factory_secret.write().await = Some(direct.clone());
            return Ok(direct.clone());
        }

        if self.factory_secret_name.is_empty() {
            return Err(GateError::Config("factory secret id not configured".into()));
        }

        debug!(name = %self.factory_secret_name, "Loading factory secret from store");
        let value = self
            .store
            .get(&self.factory_secret_name)
            .await
            .map_err(|e| GateError::Store(e.to_string()))?
            .unwrap_or_default();

        if value.is_empty() {
            return Err(GateError::Config("factory secret is empty".into()));
        }

        *self.factory_secret.write().await = Some(value.clone());
        Ok(value)
    }

    /// The device-key map, loaded from the store when the cache is empty.
    ///
    /// A missing or unparsable stored value yields an empty map: a corrupted
    /// store must not block provisioning of new devices. The unparsable case
    /// additionally bumps `parse_failures` so operators can see it happening.
    pub async fn device_keys(&self) -> Result<DeviceKeyMap, GateError> {
        {
            let cached = self.device_keys.read().await;
            if !cached.is_empty() {
                return Ok(cached.clone());
            }
        }

        debug!(name = %self.device_keys_name, "Loading device keys from store");
        let raw = self
            .store
            .get(&self.device_keys_name)
            .await
            .map_err(|e| GateError::Store(e.to_string()))?;

        let map = match raw {
            None => DeviceKeyMap::new(),
            Some(raw) => match serde_json::from_str::<DeviceKeyMap>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    self.parse_failures.fetch_add(1, Ordering::Relaxed);
                    warn!(error = %e, "Stored device-key map is unparsable; serving empty map");
                    DeviceKeyMap::new()
                }
            },
        };

        *self.device_keys.write().await = map.clone();
        Ok(map)
    }

    /// Replace the stored device-key map, then the cached one.
    ///
    /// Whole-value replace, not a merge: callers read-modify-write under
    /// `lock_provision`.
    pub async fn put_device_keys(&self, map: DeviceKeyMap) -> Result<(), GateError> {
        let raw = serde_json::to_string(&map)
            .map_err(|e| GateError::Store(format!("device-key map serialization: {e}")))?;

        self.store
            .put(&self.device_keys_name, &raw)
            .await
            .map_err(|e| GateError::Store(e.to_string()))?;

        *self.device_keys.write().await = map;
        Ok(())
    }

    /// Hold this guard across the whole provisioning read-modify-write.
    pub async fn lock_provision(&self) -> MutexGuard<'_, ()> {
        self.provision_lock.lock().await
    }

    /// How many times the stored map failed to parse. Operator signal only.
    pub fn parse_failures(&self) -> u64 {
        self.parse_failures.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn cache_over(store: MemoryStore) -> KeyCache {
        KeyCache::new(Arc::new(store), None, "factory", "keys")
    }

    #[tokio::test]
    async fn factory_secret_reads_through_and_caches() {
        let store = MemoryStore::new().with("factory", "s3cr3t");
        let store = Arc::new(store);
        let cache = KeyCache::new(store.clone(), None, "factory", "keys");

        assert_eq!(cache.factory_secret().await.unwrap(), "s3cr3t");

        // Later store changes are not observed: the secret is process-pinned.
        store.put("factory", "rotated").await.unwrap();
        assert_eq!(cache.factory_secret().await.unwrap(), "s3cr3t");
    }

    #[tokio::test]
    async fn direct_factory_secret_wins_over_store() {
        let store = MemoryStore::new().with("factory", "from-store");
        let cache = KeyCache::new(Arc::new(store), Some("direct".into()), "factory", "keys");
        assert_eq!(cache.factory_secret().await.unwrap(), "direct");
    }

    #[tokio::test]
    async fn unconfigured_factory_secret_is_fatal() {
        let cache = KeyCache::new(Arc::new(MemoryStore::new()), None, "", "keys");
        assert!(matches!(
            cache.factory_secret().await,
            Err(GateError::Config(_))
        ));
    }

    #[tokio::test]
    async fn empty_factory_secret_is_fatal() {
        let cache = cache_over(MemoryStore::new().with("factory", ""));
        assert!(matches!(
            cache.factory_secret().await,
            Err(GateError::Config(_))
        ));
    }

    #[tokio::test]
    async fn missing_device_keys_is_empty_map() {
        let cache = cache_over(MemoryStore::new());
        assert!(cache.device_keys().await.unwrap().is_empty());
        assert_eq!(cache.parse_failures(), 0);
    }

    #[tokio::test]
    async fn unparsable_device_keys_fail_open_to_empty() {
        let cache = cache_over(MemoryStore::new().with("keys", "not json at all"));
        assert!(cache.device_keys().await.unwrap().is_empty());
        assert_eq!(cache.parse_failures(), 1);
    }

    #[tokio::test]
    async fn put_updates_store_and_cache() {
        let store = Arc::new(MemoryStore::new());
        let cache = KeyCache::new(store.clone(), None, "factory", "keys");

        let mut map = DeviceKeyMap::new();
        map.insert("dev-1".into(), "abcd".into());
        cache.put_device_keys(map).await.unwrap();

        let stored = store.get("keys").await.unwrap().unwrap();
        assert!(stored.contains("dev-1"));
        assert_eq!(cache.device_keys().await.unwrap()["dev-1"], "abcd");
    }

    #[tokio::test]
    async fn populated_cache_skips_the_store() {
        let store = Arc::new(MemoryStore::new().with("keys", r#"{"dev-1":"abcd"}"#));
        let cache = KeyCache::new(store.clone(), None, "factory", "keys");

        assert_eq!(cache.device_keys().await.unwrap().len(), 1);

        // Replacing the stored value behind the cache's back is not observed.
        store.put("keys", r#"{"dev-2":"efgh"}"#).await.unwrap();
        let keys = cache.device_keys().await.unwrap();
        assert!(keys.contains_key("dev-1"));
        assert!(!keys.contains_key("dev-2"));
    }
}
