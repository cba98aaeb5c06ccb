//! End-to-end cycles through a real exchange directory

use panel_bridge_core::{Args, Command, CommandResult, Position};
use panel_bridge_protocol::{
    EMPTY_BATCH, ExchangeDir, decode_results, decode_status, encode_commands, read_file,
    write_atomic,
};
use panel_bridge_runtime::{BridgeRuntime, PollOutcome, RuntimeConfig, SimulatedServer};
use std::time::Duration;
use tempfile::TempDir;

struct Harness {
    _tmp: TempDir,
    dir: ExchangeDir,
    host: SimulatedServer,
    runtime: BridgeRuntime,
    now: u64,
}

impl Harness {
    fn new(host: SimulatedServer) -> Self {
        let tmp = TempDir::new().unwrap();
        let config = RuntimeConfig::with_dir(tmp.path().join("servertest"), "servertest")
            .with_poll_interval(Duration::from_millis(100));
        let runtime = BridgeRuntime::init(config, &host, 0);
        let dir = runtime.exchange_dir().clone();
        Self {
            _tmp: tmp,
            dir,
            host,
            runtime,
            now: 0,
        }
    }

    fn submit(&self, commands: &[Command]) {
        write_atomic(&self.dir.commands(), &encode_commands(commands).unwrap()).unwrap();
    }

    fn tick(&mut self) -> PollOutcome {
        self.now += 100;
        self.runtime.tick(&mut self.host, self.now)
    }

    fn results(&self) -> Vec<CommandResult> {
        decode_results(&read_file(&self.dir.results()).unwrap()).unwrap()
    }

    fn result(&self, id: &str) -> CommandResult {
        self.results()
            .into_iter()
            .find(|r| r.id == id)
            .unwrap_or_else(|| panic!("no result for {}", id))
    }
}

#[test]
fn ping_scenario() {
    let mut h = Harness::new(SimulatedServer::modern("servertest"));
    h.submit(&[Command::new("c1", "ping", Args::new())]);
    h.tick();

    let result = h.result("c1");
    assert!(result.success);
    assert_eq!(result.field("message").unwrap(), "pong");
    assert!(result.error.is_none());
    assert_eq!(read_file(&h.dir.commands()).unwrap(), EMPTY_BATCH);
}

#[test]
fn resubmission_is_idempotent() {
    let mut h = Harness::new(SimulatedServer::modern("servertest"));
    h.submit(&[Command::new("c1", "ping", Args::new())]);
    h.tick();
    h.submit(&[Command::new("c1", "ping", Args::new())]);
    h.tick();

    assert_eq!(h.results().len(), 1);
    assert_eq!(h.runtime.state().stats.processed, 1);
    assert_eq!(read_file(&h.dir.commands()).unwrap(), EMPTY_BATCH);
}

#[test]
fn lua_written_empty_batch_is_a_no_op() {
    let mut h = Harness::new(SimulatedServer::legacy("servertest"));
    write_atomic(&h.dir.commands(), br#"{"commands":{}}"#).unwrap();
    assert_eq!(h.tick(), PollOutcome::NoCommands);
    assert!(read_file(&h.dir.results()).is_none());
}

#[test]
fn unknown_action_counts_as_failure() {
    let mut h = Harness::new(SimulatedServer::modern("servertest"));
    h.submit(&[Command::new("u1", "teleportEverybody", Args::new())]);
    h.tick();

    let result = h.result("u1");
    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Unknown command: teleportEverybody"));
    assert_eq!(h.runtime.state().stats.failed, 1);
}

#[test]
fn same_command_uses_each_generations_entry_point() {
    for (host, method) in [
        (SimulatedServer::modern("servertest"), "player.setRole"),
        (SimulatedServer::legacy("servertest"), "player.setAccessLevel"),
    ] {
        let mut h = Harness::new(host.with_player("Bob", Position::default()));
        let args = Args::new().with("username", "Bob").with("level", "admin");
        h.submit(&[Command::new("a1", "setAccessLevel", args)]);
        h.tick();

        let result = h.result("a1");
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.field("method").unwrap(), method);
    }
}

#[test]
fn status_heartbeat_reflects_activity() {
    let mut h = Harness::new(SimulatedServer::legacy("servertest").with_player("Bob", Position::default()));
    h.submit(&[
        Command::new("s1", "getServerInfo", Args::new()),
        Command::new("s2", "getPlayer", Args::new().with("username", "Nobody")),
    ]);
    // Status is rewritten every third poll
    for _ in 0..3 {
        h.tick();
    }

    let status = decode_status(&read_file(&h.dir.status()).unwrap())
        .unwrap()
        .unwrap();
    assert!(status.alive);
    assert_eq!(status.server_name, "servertest");
    assert_eq!(status.players, ["Bob"]);
    assert_eq!(status.stats.processed, 2);
    assert_eq!(status.stats.succeeded, 1);
    assert_eq!(status.stats.failed, 1);
}
