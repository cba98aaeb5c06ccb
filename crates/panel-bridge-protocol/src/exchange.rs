//! Shared exchange directory
//!
//! Layout of `{bridge path}`:
//! - `commands.json`: pending batch, written by the host, cleared by the runtime
//! - `results.json`: bounded result log, written by the runtime
//! - `status.json`: heartbeat snapshot, written by the runtime
//! - `.init`: marker created when the runtime first initialises
//! - `startup.json`: one-time info snapshot from runtime init
//!
//! Nothing locks these files. Every write goes to a process-unique temporary
//! file that is then renamed over the target, and every read treats a missing
//! or unreadable file as "no data yet".

use panel_bridge_core::{BridgeError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

pub const COMMANDS_FILE: &str = "commands.json";
pub const RESULTS_FILE: &str = "results.json";
pub const STATUS_FILE: &str = "status.json";
pub const INIT_MARKER: &str = ".init";
pub const STARTUP_FILE: &str = "startup.json";

/// Directory under the cache or install dir that holds every server's exchange dir
pub const BRIDGE_SUBDIR: &str = "Lua/panelbridge";

/// Paths inside one bridge exchange directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeDir {
    root: PathBuf,
}

impl ExchangeDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn commands(&self) -> PathBuf {
        self.root.join(COMMANDS_FILE)
    }

    pub fn results(&self) -> PathBuf {
        self.root.join(RESULTS_FILE)
    }

    pub fn status(&self) -> PathBuf {
        self.root.join(STATUS_FILE)
    }

    pub fn init_marker(&self) -> PathBuf {
        self.root.join(INIT_MARKER)
    }

    pub fn startup(&self) -> PathBuf {
        self.root.join(STARTUP_FILE)
    }

    /// Liveness file present (the runtime has published at least once)
    pub fn is_active(&self) -> bool {
        self.status().is_file()
    }

    /// Init marker present
    pub fn is_initialized(&self) -> bool {
        self.init_marker().is_file()
    }

    pub fn exists(&self) -> bool {
        self.root.is_dir()
    }

    /// Create the directory if needed
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(|e| {
            BridgeError::IoFailure(format!(
                "Failed to create bridge dir {}: {}",
                self.root.display(),
                e
            ))
        })
    }
}

/// Read a whole file; missing or unreadable files yield `None`
pub fn read_file(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log_read_error(path, &e);
            None
        }
    }
}

/// Async variant of [`read_file`]
pub async fn read_file_async(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log_read_error(path, &e);
            None
        }
    }
}

/// Replace a file's content in one step (temp file + rename)
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes).map_err(|e| write_error(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(write_error(path, e));
    }
    Ok(())
}

/// Async variant of [`write_atomic`]
pub async fn write_atomic_async(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, bytes)
        .await
        .map_err(|e| write_error(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(write_error(path, e));
    }
    Ok(())
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Host and runtime both rewrite `commands.json`, and one process may have
/// several writes in flight, so the temp name carries the pid and a sequence
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "exchange".to_string());
    let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}.{}.tmp", name, std::process::id(), seq))
}

fn write_error(path: &Path, e: std::io::Error) -> BridgeError {
    BridgeError::IoFailure(format!("Failed to write {}: {}", path.display(), e))
}

fn log_read_error(path: &Path, e: &std::io::Error) {
    if e.kind() == ErrorKind::NotFound {
        debug!("{} not present yet", path.display());
    } else {
        warn!("Failed to read {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout() {
        let dir = ExchangeDir::new("/srv/Lua/panelbridge/servertest");
        assert_eq!(
            dir.commands(),
            PathBuf::from("/srv/Lua/panelbridge/servertest/commands.json")
        );
        assert_eq!(
            dir.init_marker(),
            PathBuf::from("/srv/Lua/panelbridge/servertest/.init")
        );
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        assert!(read_file(&tmp.path().join("nope.json")).is_none());
    }

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_temp() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(COMMANDS_FILE);
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(read_file(&path).unwrap(), b"second");

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_temp_names_are_unique_per_write() {
        let path = Path::new("/srv/bridge/commands.json");
        let first = temp_path(path);
        let second = temp_path(path);
        assert_ne!(first, second);
        assert_eq!(first.parent(), path.parent());
    }

    #[test]
    fn test_write_into_missing_dir_fails() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent").join(STATUS_FILE);
        assert!(matches!(
            write_atomic(&path, b"{}"),
            Err(BridgeError::IoFailure(_))
        ));
    }

    #[test]
    fn test_state_probes() {
        let tmp = TempDir::new().unwrap();
        let dir = ExchangeDir::new(tmp.path().join("bridge"));
        assert!(!dir.exists());
        dir.ensure().unwrap();
        assert!(dir.exists());
        assert!(!dir.is_initialized());
        std::fs::write(dir.init_marker(), b"1").unwrap();
        assert!(dir.is_initialized());
        assert!(!dir.is_active());
        std::fs::write(dir.status(), b"{}").unwrap();
        assert!(dir.is_active());
    }

    #[tokio::test]
    async fn test_async_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(RESULTS_FILE);
        assert!(read_file_async(&path).await.is_none());
        write_atomic_async(&path, b"{\"results\":[]}").await.unwrap();
        assert_eq!(read_file_async(&path).await.unwrap(), b"{\"results\":[]}");
    }
}
