//! Controller and runtime talking through a real exchange directory

use panel_bridge_core::{Args, Position, now_millis};
use panel_bridge_host::{
    BridgeController, BridgeEvent, ControllerConfig, Liveness, MemoryPathStore, PathSource,
    PathState, PathStore, ServerIdentity,
};
use panel_bridge_runtime::{BridgeRuntime, RuntimeConfig, SimulatedServer};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct Setup {
    _tmp: TempDir,
    host: SimulatedServer,
    runtime: BridgeRuntime,
    controller: BridgeController,
    store: Arc<MemoryPathStore>,
}

impl Setup {
    fn new(host: SimulatedServer) -> Self {
        let tmp = TempDir::new().unwrap();
        let cache_dir = tmp.path().join("Zomboid");

        let config = RuntimeConfig::for_server(&cache_dir, "servertest")
            .with_poll_interval(Duration::from_millis(10));
        let runtime = BridgeRuntime::init(config, &host, now_millis());

        let store = Arc::new(MemoryPathStore::new());
        let controller = BridgeController::new(
            ControllerConfig::for_server(ServerIdentity::new("servertest", &cache_dir))
                .with_poll_interval(Duration::from_millis(20)),
            Arc::clone(&store) as Arc<dyn PathStore>,
        );
        Self {
            _tmp: tmp,
            host,
            runtime,
            controller,
            store,
        }
    }

    /// One runtime poll, far enough ahead to always be due
    fn tick(&mut self) {
        let now = now_millis() + 1_000;
        self.runtime.tick(&mut self.host, now);
    }
}

#[tokio::test]
async fn auto_start_finds_the_running_runtime() {
    let s = Setup::new(SimulatedServer::modern("servertest"));
    let resolved = s.controller.auto_start().await.unwrap().unwrap();

    assert_eq!(resolved.path, s.runtime.exchange_dir().root());
    assert_eq!(resolved.source, PathSource::CacheDir);
    assert_eq!(resolved.state, PathState::Active);
    assert_eq!(
        s.store.load("servertest").await.unwrap().as_deref(),
        Some(s.runtime.exchange_dir().root())
    );

    s.controller.refresh_now().await;
    assert_eq!(s.controller.liveness().await, Liveness::Alive);
    s.controller.stop().await;
}

#[tokio::test]
async fn command_round_trip() {
    let mut s = Setup::new(SimulatedServer::legacy("servertest"));
    s.controller.configure(s.runtime.exchange_dir().root()).await;
    let mut events = s.controller.subscribe();

    let ping = s.controller.send_command("ping", Args::new()).await.unwrap();
    let info = s
        .controller
        .send_command("getServerInfo", Args::new())
        .await
        .unwrap();
    s.tick();
    s.controller.refresh_now().await;

    let result = s.controller.result_for(&ping).await.unwrap();
    assert!(result.success);
    assert_eq!(result.field("message").unwrap(), "pong");
    assert!(s.controller.result_for(&info).await.unwrap().success);

    let mut reported = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let BridgeEvent::CommandResult(result) = event {
            reported.push(result.id);
        }
    }
    assert_eq!(reported, [ping, info]);
}

#[tokio::test]
async fn failures_come_back_as_results() {
    let mut s = Setup::new(
        SimulatedServer::modern("servertest").with_player("Bob", Position::default()),
    );
    s.controller.configure(s.runtime.exchange_dir().root()).await;

    let kick = s
        .controller
        .send_command("kickPlayer", Args::new().with("username", "Nobody"))
        .await
        .unwrap();
    let unknown = s
        .controller
        .send_command("summonMeteor", Args::new())
        .await
        .unwrap();
    s.tick();
    s.controller.refresh_now().await;

    assert!(!s.controller.result_for(&kick).await.unwrap().success);
    assert_eq!(
        s.controller.result_for(&unknown).await.unwrap().error.as_deref(),
        Some("Unknown command: summonMeteor")
    );
}

#[tokio::test]
async fn teardown_reads_as_stale() {
    let s = Setup::new(SimulatedServer::modern("servertest"));
    s.controller.configure(s.runtime.exchange_dir().root()).await;
    s.controller.refresh_now().await;
    assert_eq!(s.controller.liveness().await, Liveness::Alive);

    let Setup {
        host,
        runtime,
        controller,
        _tmp,
        ..
    } = s;
    runtime.teardown(&host, now_millis());
    controller.refresh_now().await;
    assert_eq!(controller.liveness().await, Liveness::Stale);
}
