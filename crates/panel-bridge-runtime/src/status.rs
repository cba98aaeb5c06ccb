//! Status heartbeat
//!
//! Every status interval the publisher rebuilds the full snapshot and
//! overwrites `status.json`. A failed write, or a host call that panics while
//! the snapshot is built, is logged and the next tick tries again.

use crate::host::HostApi;
use crate::processor::panic_message;
use crate::state::BridgeState;
use panel_bridge_core::{ApiCapabilitySet, BRIDGE_VERSION, StatusSnapshot};
use panel_bridge_protocol::{ExchangeDir, encode_status, write_atomic};
use serde_json::json;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Build a complete snapshot from live state
pub fn snapshot(
    host: &dyn HostApi,
    caps: &ApiCapabilitySet,
    state: &BridgeState,
    alive: bool,
    now: u64,
) -> StatusSnapshot {
    let players: Vec<String> = host
        .online_players()
        .into_iter()
        .map(|p| p.username)
        .collect();
    StatusSnapshot {
        alive,
        version: BRIDGE_VERSION.to_string(),
        timestamp: now,
        server_name: state.server_name.clone(),
        player_count: players.len(),
        players,
        path: state.path.display().to_string(),
        debug_mode: state.debug.debug_mode(),
        stats: state.stats,
        api_generation: Some(caps.generation),
        uptime_seconds: state.uptime_seconds(now),
        last_command_at: state.last_command_at,
    }
}

/// Periodic writer of `status.json`
#[derive(Debug)]
pub struct StatusPublisher {
    interval_ms: u64,
    last_publish: Option<u64>,
}

impl StatusPublisher {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_publish: None,
        }
    }

    pub fn is_due(&self, now: u64) -> bool {
        match self.last_publish {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval_ms,
        }
    }

    /// Publish if due; returns whether a snapshot was written
    pub fn tick(
        &mut self,
        dir: &ExchangeDir,
        host: &dyn HostApi,
        caps: &ApiCapabilitySet,
        state: &mut BridgeState,
        now: u64,
    ) -> bool {
        if !self.is_due(now) {
            return false;
        }
        self.last_publish = Some(now);
        let built =
            panic::catch_unwind(AssertUnwindSafe(|| snapshot(host, caps, state, true, now)));
        match built {
            Ok(status) => self.publish(dir, &status, state),
            Err(payload) => {
                state.debug.error(
                    "Failed to build status",
                    json!({ "error": panic_message(payload.as_ref()) }),
                );
                false
            }
        }
    }

    /// Write one snapshot immediately
    pub fn publish(&self, dir: &ExchangeDir, status: &StatusSnapshot, state: &mut BridgeState) -> bool {
        let written = encode_status(status).and_then(|bytes| write_atomic(&dir.status(), &bytes));
        match written {
            Ok(()) => {
                debug!(
                    "Published status: {} players, {} processed",
                    status.player_count, status.stats.processed
                );
                true
            }
            Err(e) => {
                state
                    .debug
                    .error("Failed to write status", json!({ "error": e.to_string() }));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_log::DebugLog;
    use crate::probe::detect;
    use crate::sim::SimulatedServer;
    use panel_bridge_core::Position;
    use panel_bridge_protocol::{decode_status, read_file};
    use tempfile::TempDir;

    fn setup(tmp: &TempDir) -> (ExchangeDir, SimulatedServer, BridgeState) {
        let dir = ExchangeDir::new(tmp.path());
        let host = SimulatedServer::legacy("servertest")
            .with_player("Bob", Position::new(10.0, 10.0, 0.0))
            .with_player("Ann", Position::new(20.0, 20.0, 0.0));
        let state = BridgeState::new("servertest", tmp.path().to_path_buf(), DebugLog::default(), 1_000);
        (dir, host, state)
    }

    #[test]
    fn test_snapshot_counts_players() {
        let tmp = TempDir::new().unwrap();
        let (_, host, mut state) = setup(&tmp);
        let caps = detect(&host);
        state.stats.record(true);
        let status = snapshot(&host, &caps, &state, true, 11_000);
        assert_eq!(status.player_count, 2);
        assert_eq!(status.players.len(), 2);
        assert_eq!(status.uptime_seconds, 10);
        assert_eq!(status.stats.processed, 1);
        assert_eq!(status.server_name, "servertest");
    }

    #[test]
    fn test_publishes_only_when_due() {
        let tmp = TempDir::new().unwrap();
        let (dir, host, mut state) = setup(&tmp);
        let caps = detect(&host);
        let mut publisher = StatusPublisher::new(1_500);

        assert!(publisher.tick(&dir, &host, &caps, &mut state, 10_000));
        assert!(!publisher.tick(&dir, &host, &caps, &mut state, 11_000));
        assert!(publisher.tick(&dir, &host, &caps, &mut state, 11_500));

        let status = decode_status(&read_file(&dir.status()).unwrap())
            .unwrap()
            .unwrap();
        assert!(status.alive);
        assert_eq!(status.timestamp, 11_500);
    }

    #[test]
    fn test_host_panic_is_logged_and_retried() {
        let tmp = TempDir::new().unwrap();
        let (dir, host, mut state) = setup(&tmp);
        let caps = detect(&host);
        let broken = host.clone().panicking_roster();
        let mut publisher = StatusPublisher::new(1_500);

        assert!(!publisher.tick(&dir, &broken, &caps, &mut state, 10_000));
        assert_eq!(state.debug.len(), 1);
        assert!(read_file(&dir.status()).is_none());

        assert!(publisher.tick(&dir, &host, &caps, &mut state, 11_500));
        assert!(read_file(&dir.status()).is_some());
    }

    #[test]
    fn test_write_failure_is_logged_and_retried() {
        let tmp = TempDir::new().unwrap();
        let (_, host, mut state) = setup(&tmp);
        let caps = detect(&host);
        let missing = ExchangeDir::new(tmp.path().join("gone"));
        let mut publisher = StatusPublisher::new(1_500);

        assert!(!publisher.tick(&missing, &host, &caps, &mut state, 10_000));
        assert_eq!(state.debug.len(), 1);

        missing.ensure().unwrap();
        assert!(publisher.tick(&missing, &host, &caps, &mut state, 11_500));
    }
}
