//! panel-bridge: drive a game server's bridge runtime from the command line
//!
//! Usage:
//! - `panel-bridge resolve` prints where the exchange directory was found
//! - `panel-bridge send <action> [json-args]` submits one command and prints its result
//! - `panel-bridge watch` prints bridge events as JSON lines until interrupted
//!
//! The server is picked with `PANEL_BRIDGE_SERVER_NAME`, `PANEL_BRIDGE_CACHE_DIR`
//! and `PANEL_BRIDGE_INSTALL_DIR`. Discovered paths are remembered in
//! `PANEL_BRIDGE_SETTINGS` (default `{cache_dir}/panel-bridge-paths.json`).

use anyhow::{Context, Result, bail};
use panel_bridge_core::Args;
use panel_bridge_host::{
    BridgeController, ControllerConfig, JsonFilePathStore, PathResolver, PathStore,
    ServerIdentity,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: panel-bridge <resolve | send <action> [json-args] | watch>";

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

fn settings_file(server: &ServerIdentity) -> PathBuf {
    std::env::var("PANEL_BRIDGE_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|_| server.cache_dir.join("panel-bridge-paths.json"))
}

fn parse_args(raw: Option<&String>) -> Result<Args> {
    let Some(raw) = raw else {
        return Ok(Args::new());
    };
    match serde_json::from_str(raw).context("command arguments are not valid JSON")? {
        Value::Object(map) => Ok(Args::from(map)),
        other => bail!("command arguments must be a JSON object, got {}", other),
    }
}

async fn resolve(server: ServerIdentity, store: &dyn PathStore) -> Result<()> {
    let persisted = store.load(&server.name).await?;
    let resolver = PathResolver::new(server);
    for (path, source) in resolver.candidates(persisted.as_deref()) {
        info!("Candidate {:?}: {}", source, path.display());
    }
    let resolved = resolver.resolve(persisted.as_deref());
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

async fn send(controller: &BridgeController, action: &str, args: Args) -> Result<()> {
    let resolved = controller
        .auto_start()
        .await?
        .context("bridge controller was already running")?;
    if !resolved.is_active() {
        warn!(
            "Bridge at {} is {:?}; the command will wait for the runtime",
            resolved.path.display(),
            resolved.state
        );
    }

    let id = controller.send_command(action, args).await?;
    info!("Sent {} as {}", action, id);
    let result = controller.wait_for_result(&id, SEND_TIMEOUT).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    controller.stop().await;

    if !result.success {
        bail!(
            "{} failed: {}",
            action,
            result.error.as_deref().unwrap_or("no error message")
        );
    }
    Ok(())
}

async fn watch(controller: &BridgeController) -> Result<()> {
    let mut events = controller.subscribe();
    controller.auto_start().await?;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => println!("{}", serde_json::to_string(&event)?),
                Err(RecvError::Lagged(missed)) => warn!("Dropped {} events", missed),
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
        }
    }
    controller.stop().await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PANEL_BRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let server = ServerIdentity::from_env();
    let store = Arc::new(JsonFilePathStore::new(settings_file(&server)));

    match args.get(1).map(String::as_str) {
        Some("resolve") => resolve(server, store.as_ref()).await,
        Some("send") => {
            let Some(action) = args.get(2) else {
                bail!(USAGE);
            };
            let command_args = parse_args(args.get(3))?;
            let controller = BridgeController::new(ControllerConfig::for_server(server), store);
            send(&controller, action, command_args).await
        }
        Some("watch") => {
            let controller = BridgeController::new(ControllerConfig::for_server(server), store);
            watch(&controller).await
        }
        _ => bail!(USAGE),
    }
}
