//! Runtime lifecycle
//!
//! A [`BridgeRuntime`] owns everything the server side needs between ticks.
//! The embedding game calls [`BridgeRuntime::tick`] from its own timer and
//! passes its scripting API in each time; there is no global instance.

use crate::config::RuntimeConfig;
use crate::debug_log::DebugLog;
use crate::host::HostApi;
use crate::probe::detect;
use crate::processor::{CommandProcessor, PollOutcome};
use crate::state::BridgeState;
use crate::status::{StatusPublisher, snapshot};
use panel_bridge_core::{ApiCapabilitySet, BRIDGE_VERSION, Result, StartupInfo};
use panel_bridge_protocol::{ExchangeDir, encode_startup, write_atomic};
use serde_json::json;
use tracing::{error, info};

pub struct BridgeRuntime {
    config: RuntimeConfig,
    dir: ExchangeDir,
    caps: ApiCapabilitySet,
    state: BridgeState,
    processor: CommandProcessor,
    publisher: StatusPublisher,
    active: bool,
}

impl BridgeRuntime {
    /// Set up the exchange directory and probe the host
    ///
    /// If the directory or its `.init` marker cannot be created the runtime is
    /// returned inert: ticks do nothing until [`reconfigure`](Self::reconfigure)
    /// succeeds.
    pub fn init(config: RuntimeConfig, host: &dyn HostApi, now: u64) -> Self {
        let dir = ExchangeDir::new(&config.exchange_dir);
        let caps = detect(host);
        let state = BridgeState::new(
            config.server_name.clone(),
            config.exchange_dir.clone(),
            DebugLog::new(config.debug_log_capacity, config.debug_mode),
            now,
        );
        let processor = CommandProcessor::new(dir.clone(), &config);
        let publisher = StatusPublisher::new(config.status_interval.as_millis() as u64);

        let mut runtime = Self {
            config,
            dir,
            caps,
            state,
            processor,
            publisher,
            active: false,
        };
        runtime.start(host, now);
        runtime
    }

    fn start(&mut self, host: &dyn HostApi, now: u64) {
        if let Err(e) = establish(&self.dir, now) {
            error!(
                "Cannot establish bridge directory {}: {}",
                self.dir.root().display(),
                e
            );
            self.state.debug.error(
                "Bridge directory unavailable",
                json!({ "path": self.dir.root().display().to_string(), "error": e.to_string() }),
            );
            self.active = false;
            return;
        }
        self.active = true;

        let startup = StartupInfo {
            version: BRIDGE_VERSION.to_string(),
            server_name: self.state.server_name.clone(),
            game_version: host.game_version(),
            api_generation: self.caps.generation,
            capabilities: self.caps.names(),
            started_at: now,
            path: self.dir.root().display().to_string(),
        };
        if let Err(e) = encode_startup(&startup).and_then(|b| write_atomic(&self.dir.startup(), &b)) {
            self.state
                .debug
                .warn("Failed to write startup snapshot", json!({ "error": e.to_string() }));
        }

        self.publisher
            .tick(&self.dir, host, &self.caps, &mut self.state, now);
        info!(
            "Panel bridge v{} ready at {} ({} API, {} entry points)",
            BRIDGE_VERSION,
            self.dir.root().display(),
            self.caps.generation,
            self.caps.len()
        );
    }

    /// Point the runtime at a new exchange directory and try again
    ///
    /// Capabilities, counters and the debug log carry over.
    pub fn reconfigure(&mut self, config: RuntimeConfig, host: &dyn HostApi, now: u64) -> bool {
        self.dir = ExchangeDir::new(&config.exchange_dir);
        self.state.path = config.exchange_dir.clone();
        self.state.server_name = config.server_name.clone();
        self.state.debug.set_debug_mode(config.debug_mode);
        self.processor = CommandProcessor::new(self.dir.clone(), &config);
        self.publisher = StatusPublisher::new(config.status_interval.as_millis() as u64);
        self.config = config;
        self.start(host, now);
        self.active
    }

    /// One timer tick: poll commands if due, then publish status if due
    pub fn tick(&mut self, host: &mut dyn HostApi, now: u64) -> PollOutcome {
        if !self.active {
            return PollOutcome::NotDue;
        }
        let outcome = self
            .processor
            .poll(host, &self.caps, &mut self.state, now);
        self.publisher
            .tick(&self.dir, &*host, &self.caps, &mut self.state, now);
        outcome
    }

    /// Final status with `alive: false`
    pub fn teardown(mut self, host: &dyn HostApi, now: u64) {
        if !self.active {
            return;
        }
        let status = snapshot(host, &self.caps, &self.state, false, now);
        self.publisher.publish(&self.dir, &status, &mut self.state);
        info!("Panel bridge stopped after {}s", self.state.uptime_seconds(now));
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn capabilities(&self) -> &ApiCapabilitySet {
        &self.caps
    }

    pub fn state(&self) -> &BridgeState {
        &self.state
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn exchange_dir(&self) -> &ExchangeDir {
        &self.dir
    }

    pub fn processor(&self) -> &CommandProcessor {
        &self.processor
    }
}

/// Create the directory and its `.init` marker
fn establish(dir: &ExchangeDir, now: u64) -> Result<()> {
    dir.ensure()?;
    write_atomic(&dir.init_marker(), now.to_string().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedServer;
    use panel_bridge_core::{ApiGeneration, Args, Command, Position};
    use panel_bridge_protocol::{
        decode_startup, decode_status, encode_commands, read_file,
    };
    use tempfile::TempDir;

    fn config(tmp: &TempDir) -> RuntimeConfig {
        RuntimeConfig::for_server(tmp.path(), "servertest")
    }

    #[test]
    fn test_init_writes_marker_startup_and_status() {
        let tmp = TempDir::new().unwrap();
        let host = SimulatedServer::modern("servertest");
        let runtime = BridgeRuntime::init(config(&tmp), &host, 1_000);
        assert!(runtime.is_active());

        let dir = runtime.exchange_dir();
        assert!(dir.root().ends_with("Lua/panelbridge/servertest"));
        assert_eq!(read_file(&dir.init_marker()).unwrap(), b"1000");

        let startup = decode_startup(&read_file(&dir.startup()).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(startup.api_generation, ApiGeneration::Modern);
        assert_eq!(startup.started_at, 1_000);
        assert!(startup.capabilities.contains(&"world.save".to_string()));

        let status = decode_status(&read_file(&dir.status()).unwrap())
            .unwrap()
            .unwrap();
        assert!(status.alive);
    }

    #[test]
    fn test_inert_when_directory_cannot_be_created() {
        let tmp = TempDir::new().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let mut host = SimulatedServer::legacy("servertest");

        let mut runtime = BridgeRuntime::init(
            RuntimeConfig::with_dir(blocker.join("bridge"), "servertest"),
            &host,
            0,
        );
        assert!(!runtime.is_active());
        assert_eq!(runtime.tick(&mut host, 10_000), PollOutcome::NotDue);

        assert!(runtime.reconfigure(config(&tmp), &host, 20_000));
        assert!(runtime.is_active());
        assert_eq!(runtime.state().debug.len(), 1);
    }

    #[test]
    fn test_tick_processes_and_teardown_marks_dead() {
        let tmp = TempDir::new().unwrap();
        let mut host = SimulatedServer::legacy("servertest").with_player("Bob", Position::default());
        let mut runtime = BridgeRuntime::init(config(&tmp), &host, 0);
        let dir = runtime.exchange_dir().clone();

        let batch = encode_commands(&[Command::new("c1", "getPlayers", Args::new())]).unwrap();
        write_atomic(&dir.commands(), &batch).unwrap();
        assert_eq!(
            runtime.tick(&mut host, 600),
            PollOutcome::Processed {
                dispatched: 1,
                skipped: 0
            }
        );
        assert_eq!(runtime.state().stats.succeeded, 1);

        runtime.teardown(&host, 2_000);
        let status = decode_status(&read_file(&dir.status()).unwrap())
            .unwrap()
            .unwrap();
        assert!(!status.alive);
        assert_eq!(status.stats.processed, 1);
        assert_eq!(status.last_command_at, Some(600));
    }
}
