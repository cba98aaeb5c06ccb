//! Bridge self-management commands

use super::{HandlerContext, data};
use crate::status::snapshot;
use panel_bridge_core::command::{DebugLogQuery, Toggle};
use panel_bridge_core::{Data, Result};
use serde_json::json;

pub fn ping(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    Ok(data(json!({ "message": "pong", "timestamp": ctx.now })))
}

pub fn get_status(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let status = snapshot(&*ctx.host, ctx.caps, ctx.state, true, ctx.now);
    Ok(data(serde_json::to_value(status)?))
}

pub fn get_capabilities(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    Ok(data(json!({
        "generation": ctx.caps.generation,
        "capabilities": ctx.caps.names(),
        "count": ctx.caps.len(),
    })))
}

pub fn get_stats(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let stats = ctx.state.stats;
    Ok(data(json!({
        "processed": stats.processed,
        "succeeded": stats.succeeded,
        "failed": stats.failed,
        "uptimeSeconds": ctx.state.uptime_seconds(ctx.now),
    })))
}

pub fn reset_stats(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let previous = std::mem::take(&mut ctx.state.stats);
    ctx.state.debug.info("Stats reset", json!({ "previous": previous }));
    Ok(data(json!({ "reset": true, "previous": previous })))
}

pub fn set_debug_mode(ctx: &mut HandlerContext<'_>, toggle: Toggle) -> Result<Data> {
    ctx.state.debug.set_debug_mode(toggle.enabled);
    ctx.state
        .debug
        .info("Debug mode changed", json!({ "enabled": toggle.enabled }));
    Ok(data(json!({ "debugMode": toggle.enabled })))
}

pub fn get_debug_log(ctx: &mut HandlerContext<'_>, query: DebugLogQuery) -> Result<Data> {
    let entries = ctx.state.debug.entries(query.limit, query.level);
    Ok(data(json!({
        "count": entries.len(),
        "entries": entries,
        "debugMode": ctx.state.debug.debug_mode(),
    })))
}

pub fn clear_debug_log(ctx: &mut HandlerContext<'_>) -> Result<Data> {
    let cleared = ctx.state.debug.clear();
    Ok(data(json!({ "cleared": cleared })))
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{run, run_with};
    use crate::debug_log::DebugLog;
    use crate::probe::detect;
    use crate::sim::SimulatedServer;
    use crate::state::BridgeState;
    use panel_bridge_core::{Args, BridgeStats};
    use std::path::PathBuf;

    #[test]
    fn test_ping_pong() {
        let mut host = SimulatedServer::legacy("servertest");
        let data = run(&mut host, "ping", Args::new()).unwrap();
        assert_eq!(data["message"], "pong");
        assert_eq!(data["timestamp"], 1_700_000_000_000u64);
    }

    #[test]
    fn test_capabilities_report_generation() {
        let mut host = SimulatedServer::modern("servertest");
        let data = run(&mut host, "getCapabilities", Args::new()).unwrap();
        assert_eq!(data["generation"], "modern");
        assert!(
            data["capabilities"]
                .as_array()
                .unwrap()
                .iter()
                .any(|c| c == "player.teleportTo")
        );
    }

    #[test]
    fn test_reset_stats_returns_previous() {
        let mut host = SimulatedServer::legacy("servertest");
        let caps = detect(&host);
        let mut state = BridgeState::new("s", PathBuf::from("/x"), DebugLog::default(), 0);
        state.stats = BridgeStats {
            processed: 5,
            succeeded: 4,
            failed: 1,
        };
        let data = run_with(&mut host, &caps, &mut state, "resetStats", Args::new()).unwrap();
        assert_eq!(data["previous"]["processed"], 5);
        assert_eq!(state.stats, BridgeStats::default());
    }

    #[test]
    fn test_debug_mode_and_log() {
        let mut host = SimulatedServer::legacy("servertest");
        let caps = detect(&host);
        let mut state = BridgeState::new("s", PathBuf::from("/x"), DebugLog::default(), 0);

        run_with(&mut host, &caps, &mut state, "setDebugMode", Args::new().with("enabled", true)).unwrap();
        assert!(state.debug.debug_mode());

        let data = run_with(
            &mut host,
            &caps,
            &mut state,
            "getDebugLog",
            Args::new().with("level", "info"),
        )
        .unwrap();
        assert_eq!(data["count"], 1);
        assert_eq!(data["entries"][0]["message"], "Debug mode changed");

        let data = run_with(&mut host, &caps, &mut state, "clearDebugLog", Args::new()).unwrap();
        assert_eq!(data["cleared"], 1);
    }
}
