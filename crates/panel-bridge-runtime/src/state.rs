//! Mutable runtime state shared by the processor, publisher and handlers

use crate::debug_log::DebugLog;
use panel_bridge_core::BridgeStats;
use std::path::PathBuf;

#[derive(Debug)]
pub struct BridgeState {
    pub server_name: String,
    /// Exchange directory, reported in status
    pub path: PathBuf,
    pub stats: BridgeStats,
    pub debug: DebugLog,
    /// Unix ms
    pub started_at: u64,
    /// Unix ms of the last dispatched command
    pub last_command_at: Option<u64>,
}

impl BridgeState {
    pub fn new(server_name: impl Into<String>, path: PathBuf, debug: DebugLog, started_at: u64) -> Self {
        Self {
            server_name: server_name.into(),
            path,
            stats: BridgeStats::default(),
            debug,
            started_at,
            last_command_at: None,
        }
    }

    pub fn uptime_seconds(&self, now: u64) -> u64 {
        now.saturating_sub(self.started_at) / 1000
    }
}
