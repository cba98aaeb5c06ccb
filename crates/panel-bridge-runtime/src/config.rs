//! Runtime configuration

use crate::debug_log::DEFAULT_DEBUG_LOG_CAPACITY;
use crate::dedupe::DEFAULT_DEDUPE_CAPACITY;
use panel_bridge_protocol::exchange::BRIDGE_SUBDIR;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Results kept in `results.json`
pub const DEFAULT_RESULT_CAPACITY: usize = 50;

/// Configuration for the server-side runtime
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Shared exchange directory
    pub exchange_dir: PathBuf,
    /// Server name, used in status and startup snapshots
    pub server_name: String,
    /// How often `commands.json` is read
    pub poll_interval: Duration,
    /// How often `status.json` is rewritten
    pub status_interval: Duration,
    /// Record debug-level entries in the in-memory log
    pub debug_mode: bool,
    pub result_capacity: usize,
    pub dedupe_capacity: usize,
    pub debug_log_capacity: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| "/tmp".to_string());
        Self::for_server(PathBuf::from(home).join("Zomboid"), "servertest")
    }
}

impl RuntimeConfig {
    /// Config for `{cache_dir}/Lua/panelbridge/{server_name}`
    pub fn for_server(cache_dir: impl AsRef<Path>, server_name: &str) -> Self {
        Self::with_dir(
            cache_dir.as_ref().join(BRIDGE_SUBDIR).join(server_name),
            server_name,
        )
    }

    /// Config with an explicit exchange directory
    pub fn with_dir(exchange_dir: impl Into<PathBuf>, server_name: &str) -> Self {
        let poll_interval = Duration::from_millis(500);
        Self {
            exchange_dir: exchange_dir.into(),
            server_name: server_name.to_string(),
            poll_interval,
            status_interval: poll_interval * 3,
            debug_mode: false,
            result_capacity: DEFAULT_RESULT_CAPACITY,
            dedupe_capacity: DEFAULT_DEDUPE_CAPACITY,
            debug_log_capacity: DEFAULT_DEBUG_LOG_CAPACITY,
        }
    }

    /// Change the poll interval, keeping the status interval at three polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.status_interval = poll_interval * 3;
        self
    }
}
