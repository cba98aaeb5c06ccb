//! Persistence of discovered bridge paths
//!
//! The panel remembers, per server, the last path where the runtime was
//! seen alive so the resolver can try it first next time.

use async_trait::async_trait;
use panel_bridge_core::{BridgeError, Result};
use panel_bridge_protocol::{read_file_async, write_atomic_async};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Settings storage for discovered paths
#[async_trait]
pub trait PathStore: Send + Sync {
    async fn load(&self, server: &str) -> Result<Option<PathBuf>>;

    async fn save(&self, server: &str, path: &Path) -> Result<()>;
}

/// Store that forgets everything on exit
#[derive(Debug, Default)]
pub struct MemoryPathStore {
    paths: Mutex<BTreeMap<String, PathBuf>>,
}

impl MemoryPathStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PathStore for MemoryPathStore {
    async fn load(&self, server: &str) -> Result<Option<PathBuf>> {
        Ok(self.paths.lock().await.get(server).cloned())
    }

    async fn save(&self, server: &str, path: &Path) -> Result<()> {
        self.paths
            .lock()
            .await
            .insert(server.to_string(), path.to_path_buf());
        Ok(())
    }
}

/// Store backed by a small JSON object of server name to path
#[derive(Debug)]
pub struct JsonFilePathStore {
    file: PathBuf,
    lock: Mutex<()>,
}

impl JsonFilePathStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    async fn read_all(&self) -> Result<BTreeMap<String, PathBuf>> {
        match read_file_async(&self.file).await {
            None => Ok(BTreeMap::new()),
            Some(bytes) if bytes.iter().all(|b| b.is_ascii_whitespace()) => Ok(BTreeMap::new()),
            Some(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                BridgeError::DecodeFailure(format!("{}: {}", self.file.display(), e))
            }),
        }
    }
}

#[async_trait]
impl PathStore for JsonFilePathStore {
    async fn load(&self, server: &str) -> Result<Option<PathBuf>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(server))
    }

    async fn save(&self, server: &str, path: &Path) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut paths = self.read_all().await?;
        paths.insert(server.to_string(), path.to_path_buf());

        if let Some(parent) = self.file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(&paths)?;
        write_atomic_async(&self.file, &bytes).await?;
        debug!("Saved bridge path for {} to {}", server, self.file.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryPathStore::new();
        assert_eq!(store.load("servertest").await.unwrap(), None);
        assert_ok!(store.save("servertest", Path::new("/a")).await);
        assert_eq!(
            store.load("servertest").await.unwrap(),
            Some(PathBuf::from("/a"))
        );
    }

    #[tokio::test]
    async fn test_json_file_keeps_servers_apart() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFilePathStore::new(tmp.path().join("settings/bridge-paths.json"));
        assert_eq!(store.load("pve").await.unwrap(), None);

        assert_ok!(store.save("pve", Path::new("/srv/pve")).await);
        assert_ok!(store.save("pvp", Path::new("/srv/pvp")).await);

        let reopened = JsonFilePathStore::new(store.file());
        assert_eq!(reopened.load("pve").await.unwrap(), Some(PathBuf::from("/srv/pve")));
        assert_eq!(reopened.load("pvp").await.unwrap(), Some(PathBuf::from("/srv/pvp")));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_decode_failure() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("paths.json");
        tokio::fs::write(&file, b"[1, 2").await.unwrap();
        let store = JsonFilePathStore::new(&file);
        assert!(matches!(
            store.load("x").await,
            Err(BridgeError::DecodeFailure(_))
        ));
    }
}
