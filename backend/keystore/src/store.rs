//! Secret store backends.
//!
//! The durable store is a plain name → string mapping with whole-value
//! replacement. `FileStore` keeps each secret in its own file under a state
//! directory, written atomically (temp file, then rename). `MemoryStore` backs
//! tests and ephemeral deployments.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;
use tokio::fs;
use tracing::debug;

use edgegate_core::SecretStore;

/// File-per-secret store rooted at a state directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Secret names may contain `/` (e.g. `edgegate/device-keys`); flatten
    /// them so every secret stays directly under the root.
    fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.secret", name.replace(['/', '\\'], "__")))
    }
}

#[async_trait]
impl SecretStore for FileStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        let path = self.path_for(name);
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read secret: {}", path.display())),
        }
    }

    async fn put(&self, name: &str, value: &str) -> Result<()> {
        let path = self.path_for(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create state dir: {}", parent.display()))?;
        }

        // Write to temp file, then rename for atomicity.
        let tmp_path = path.with_extension("secret.tmp");
        fs::write(&tmp_path, value.as_bytes())
            .await
            .with_context(|| format!("Failed to write temp secret: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path)
            .await
            .with_context(|| format!("Failed to rename temp secret to: {}", path.display()))?;

        debug!(name = %name, "Wrote secret");
        Ok(())
    }
}

/// In-memory store for tests and ephemeral single-process deployments.
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a secret (test setup helper).
    pub fn with(self, name: &str, value: &str) -> Self {
        self.values.write().unwrap().insert(name.into(), value.into());
        self
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn get(&self, name: &str) -> Result<Option<String>> {
        Ok(self.values.read().unwrap().get(name).cloned())
    }

    async fn put(&self, name: &str, value: &str) -> Result<()> {
        self.values.write().unwrap().insert(name.into(), value.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[tokio::test]
    async fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.get("edgegate/device-keys").await.unwrap().is_none());
        store.put("edgegate/device-keys", r#"{"dev-1":"abc"}"#).await.unwrap();
        assert_eq!(
            store.get("edgegate/device-keys").await.unwrap().as_deref(),
            Some(r#"{"dev-1":"abc"}"#)
        );
    }

    #[tokio::test]
    async fn file_store_overwrites_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.put("s", "first").await.unwrap();
        store.put("s", "second").await.unwrap();
        assert_eq!(store.get("s").await.unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn slashed_names_stay_under_root() {
        let store = FileStore::new("/tmp/edgegate");
        let path = store.path_for("edgegate/device-keys");
        assert_eq!(path.parent(), Some(Path::new("/tmp/edgegate")));
    }
}
