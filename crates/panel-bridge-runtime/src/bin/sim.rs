//! panel-bridge-sim: run a bridge runtime against a simulated game server
//!
//! Usage: `panel-bridge-sim <exchange-dir> [legacy|modern] [server-name]`
//!
//! The runtime behaves exactly as it would inside a real server, so the host
//! side can be exercised end to end without a game.

use anyhow::{Result, bail};
use panel_bridge_core::{Position, now_millis};
use panel_bridge_runtime::{BridgeRuntime, RuntimeConfig, SimulatedServer};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PANEL_BRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(dir) = args.get(1) else {
        bail!("usage: panel-bridge-sim <exchange-dir> [legacy|modern] [server-name]");
    };
    let server_name = args.get(3).map(String::as_str).unwrap_or("servertest");
    let host = match args.get(2).map(String::as_str) {
        None | Some("modern") => SimulatedServer::modern(server_name),
        Some("legacy") => SimulatedServer::legacy(server_name),
        Some(other) => bail!("unknown API generation '{}'", other),
    };
    let mut host = host
        .with_player("Survivor", Position::new(10_862.0, 9_418.0, 0.0))
        .with_player("Medic", Position::new(10_870.0, 9_420.0, 0.0))
        .with_mod("panelbridge");

    let config = RuntimeConfig::with_dir(PathBuf::from(dir), server_name);
    let poll_interval = config.poll_interval;
    let mut runtime = BridgeRuntime::init(config, &host, now_millis());
    if !runtime.is_active() {
        bail!("could not initialise exchange directory {}", dir);
    }

    let mut ticker = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                runtime.tick(&mut host, now_millis());
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
        }
    }

    runtime.teardown(&host, now_millis());
    Ok(())
}
