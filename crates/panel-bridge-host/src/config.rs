//! Host-side configuration

use std::path::PathBuf;
use std::time::Duration;

/// Which game server the panel is administering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    /// Server name, the last component of the exchange path
    pub name: String,
    /// Game data directory (`~/Zomboid` by default)
    pub cache_dir: PathBuf,
    /// Dedicated server install directory, if known
    pub install_path: Option<PathBuf>,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self::new("servertest", default_cache_dir())
    }
}

impl ServerIdentity {
    pub fn new(name: impl Into<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            cache_dir: cache_dir.into(),
            install_path: None,
        }
    }

    pub fn with_install_path(mut self, install_path: impl Into<PathBuf>) -> Self {
        self.install_path = Some(install_path.into());
        self
    }

    /// Read `PANEL_BRIDGE_SERVER_NAME`, `PANEL_BRIDGE_CACHE_DIR` and
    /// `PANEL_BRIDGE_INSTALL_DIR`, falling back to the defaults
    pub fn from_env() -> Self {
        let name = std::env::var("PANEL_BRIDGE_SERVER_NAME").unwrap_or_else(|_| "servertest".into());
        let cache_dir = std::env::var("PANEL_BRIDGE_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_cache_dir());
        let identity = Self::new(name, cache_dir);
        match std::env::var("PANEL_BRIDGE_INSTALL_DIR") {
            Ok(dir) if !dir.is_empty() => identity.with_install_path(dir),
            _ => identity,
        }
    }
}

fn default_cache_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join("Zomboid")
}

/// Configuration for [`BridgeController`](crate::BridgeController)
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub server: ServerIdentity,
    /// How often results and status are read
    pub poll_interval: Duration,
    /// Status older than this means the runtime is not responding
    pub stale_after: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::for_server(ServerIdentity::default())
    }
}

impl ControllerConfig {
    pub fn for_server(server: ServerIdentity) -> Self {
        Self {
            server,
            poll_interval: Duration::from_secs(1),
            // Four missed heartbeats at the runtime's default 1.5 s interval
            stale_after: Duration::from_secs(6),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }
}
