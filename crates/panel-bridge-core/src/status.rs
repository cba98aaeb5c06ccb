//! Heartbeat and startup snapshots written by the runtime

use crate::capability::ApiGeneration;
use serde::{Deserialize, Serialize};

/// Command counters since the runtime started (or since `resetStats`)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeStats {
    pub processed: u64,
    pub succeeded: u64,
    pub failed: u64,
}

impl BridgeStats {
    pub fn record(&mut self, success: bool) {
        self.processed += 1;
        if success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Contents of `status.json`, fully replaced on every publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusSnapshot {
    pub alive: bool,
    pub version: String,
    /// Unix time in milliseconds
    pub timestamp: u64,
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub player_count: usize,
    #[serde(default, deserialize_with = "crate::lua::list")]
    pub players: Vec<String>,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub debug_mode: bool,
    #[serde(default)]
    pub stats: BridgeStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_generation: Option<ApiGeneration>,
    #[serde(default)]
    pub uptime_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_command_at: Option<u64>,
}

/// Contents of `startup.json`, written once when the runtime initialises
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartupInfo {
    pub version: String,
    pub server_name: String,
    pub game_version: String,
    pub api_generation: ApiGeneration,
    #[serde(default, deserialize_with = "crate::lua::list")]
    pub capabilities: Vec<String>,
    /// Unix time in milliseconds
    pub started_at: u64,
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        let status = StatusSnapshot {
            alive: true,
            version: "0.3.0".into(),
            timestamp: 42,
            server_name: "servertest".into(),
            player_count: 1,
            players: vec!["Bob".into()],
            path: "/srv/Lua/panelbridge/servertest".into(),
            debug_mode: false,
            stats: BridgeStats {
                processed: 3,
                succeeded: 2,
                failed: 1,
            },
            api_generation: Some(ApiGeneration::Modern),
            uptime_seconds: 10,
            last_command_at: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["serverName"], "servertest");
        assert_eq!(json["playerCount"], 1);
        assert_eq!(json["debugMode"], false);
        assert_eq!(json["stats"]["failed"], 1);
        assert_eq!(json["apiGeneration"], "modern");
        assert!(json.get("lastCommandAt").is_none());
    }

    #[test]
    fn test_lua_status_with_empty_players() {
        let json = r#"{"alive":true,"version":"1","timestamp":1,"players":{},"stats":{"processed":0,"succeeded":0,"failed":0}}"#;
        let status: StatusSnapshot = serde_json::from_str(json).unwrap();
        assert!(status.players.is_empty());
        assert_eq!(status.api_generation, None);
    }

    #[test]
    fn test_stats_record() {
        let mut stats = BridgeStats::default();
        stats.record(true);
        stats.record(false);
        assert_eq!(stats.processed, 2);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed, 1);
    }
}
