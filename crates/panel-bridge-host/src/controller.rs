//! Bridge controller
//!
//! Owns the configured exchange path and a background task that polls
//! `results.json` and `status.json`. Commands are submitted by rewriting
//! `commands.json`; their results are correlated by id against the last
//! result log read. There is no connection to lose, so liveness is judged
//! from how old the last heartbeat is.

use crate::config::ControllerConfig;
use crate::events::BridgeEvent;
use crate::fingerprint::ChangeDetector;
use crate::resolver::{PathResolver, ResolvedPath};
use crate::store::PathStore;
use panel_bridge_core::{
    Args, BridgeError, Command, CommandId, CommandResult, Result, StatusSnapshot, now_millis,
};
use panel_bridge_protocol::{
    ExchangeDir, decode_commands, decode_results, decode_status, encode_commands,
    read_file_async, write_atomic_async,
};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// How recently the runtime was heard from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Liveness {
    /// Heartbeat newer than the stale threshold
    Alive,
    /// Heartbeat too old, or the runtime said it was shutting down
    Stale,
    /// No heartbeat read yet
    Unknown,
}

impl Liveness {
    pub fn from_status(status: Option<&StatusSnapshot>, now: u64, stale_after: Duration) -> Self {
        match status {
            None => Liveness::Unknown,
            Some(s) if !s.alive => Liveness::Stale,
            Some(s) if now.saturating_sub(s.timestamp) > stale_after.as_millis() as u64 => {
                Liveness::Stale
            }
            Some(_) => Liveness::Alive,
        }
    }
}

/// State shared with the polling task
#[derive(Debug, Default)]
struct Shared {
    path: Option<PathBuf>,
    results: Vec<CommandResult>,
    seen: HashSet<CommandId>,
    status: Option<StatusSnapshot>,
    results_changes: ChangeDetector,
    status_changes: ChangeDetector,
}

impl Shared {
    /// Forget everything read from the previous path
    fn reset(&mut self) {
        self.results.clear();
        self.seen.clear();
        self.status = None;
        self.results_changes.reset();
        self.status_changes.reset();
    }
}

pub struct BridgeController {
    config: ControllerConfig,
    resolver: PathResolver,
    store: Arc<dyn PathStore>,
    shared: Arc<Mutex<Shared>>,
    task: Mutex<Option<JoinHandle<()>>>,
    /// Serializes read-merge-write of `commands.json`
    submit: Mutex<()>,
    events: broadcast::Sender<BridgeEvent>,
}

impl BridgeController {
    pub fn new(config: ControllerConfig, store: Arc<dyn PathStore>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            resolver: PathResolver::new(config.server.clone()),
            config,
            store,
            shared: Arc::new(Mutex::new(Shared::default())),
            task: Mutex::new(None),
            submit: Mutex::new(()),
            events,
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Receive lifecycle events from now on
    pub fn subscribe(&self) -> broadcast::Receiver<BridgeEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: BridgeEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Use `path` as the exchange directory
    pub async fn configure(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        {
            let mut shared = self.shared.lock().await;
            if shared.path.as_ref() != Some(&path) {
                shared.reset();
            }
            shared.path = Some(path.clone());
        }
        info!("Bridge path configured: {}", path.display());
        self.emit(BridgeEvent::Configured { path });
    }

    pub async fn path(&self) -> Option<PathBuf> {
        self.shared.lock().await.path.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.task
            .lock()
            .await
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Start polling; `Ok(false)` if already running
    pub async fn start(&self) -> Result<bool> {
        let mut task = self.task.lock().await;
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Ok(false);
        }
        let path = self.shared.lock().await.path.clone();
        let path = path.ok_or(BridgeError::NotConfigured)?;

        let shared = Arc::clone(&self.shared);
        let events = self.events.clone();
        let interval = self.config.poll_interval;
        *task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                refresh(&shared, &events).await;
            }
        }));
        drop(task);

        info!("Bridge polling started for {}", path.display());
        self.emit(BridgeEvent::Started);
        Ok(true)
    }

    /// Stop polling; `false` if it was not running
    pub async fn stop(&self) -> bool {
        let Some(task) = self.task.lock().await.take() else {
            return false;
        };
        task.abort();
        info!("Bridge polling stopped");
        self.emit(BridgeEvent::Stopped);
        true
    }

    /// Resolve the path and start, unless already running
    ///
    /// Safe to call on every trigger; returns the resolution when it started.
    pub async fn auto_start(&self) -> Result<Option<ResolvedPath>> {
        if self.is_running().await {
            debug!("Auto-start skipped: already running");
            return Ok(None);
        }

        let server = &self.config.server.name;
        let persisted = match self.store.load(server).await {
            Ok(path) => path,
            Err(e) => {
                warn!("Could not load saved bridge path: {}", e);
                None
            }
        };
        let resolved = self.resolver.resolve(persisted.as_deref());
        info!(
            "Resolved bridge path {} ({:?}, {:?})",
            resolved.path.display(),
            resolved.source,
            resolved.state
        );

        if self.path().await.as_ref() != Some(&resolved.path) {
            self.configure(resolved.path.clone()).await;
        }
        if resolved.is_active() {
            if let Err(e) = self.store.save(server, &resolved.path).await {
                warn!("Could not save bridge path: {}", e);
            }
        }

        Ok(self.start().await?.then_some(resolved))
    }

    /// Queue a command for the runtime; returns its id
    ///
    /// Commands the runtime has not picked up yet stay in the batch.
    pub async fn send_command(&self, action: &str, args: Args) -> Result<CommandId> {
        let dir = self.exchange_dir().await?;
        let id = uuid::Uuid::new_v4().to_string();

        let _submit = self.submit.lock().await;

        let mut batch = match read_file_async(&dir.commands()).await {
            Some(bytes) => decode_commands(&bytes).unwrap_or_else(|e| {
                warn!("Discarding unreadable pending batch: {}", e);
                Vec::new()
            }),
            None => Vec::new(),
        };
        batch.push(Command::new(id.clone(), action, args));

        let bytes = encode_commands(&batch)?;
        let preview: String = String::from_utf8_lossy(&bytes).chars().take(200).collect();
        debug!("[Host→Runtime] len={} json={}", bytes.len(), preview);
        write_atomic_async(&dir.commands(), &bytes).await?;
        Ok(id)
    }

    /// Result for `id` if it is in the last result log read
    pub async fn result_for(&self, id: &str) -> Option<CommandResult> {
        self.shared
            .lock()
            .await
            .results
            .iter()
            .rev()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Poll until `id` has a result or `timeout` passes
    pub async fn wait_for_result(&self, id: &str, timeout: Duration) -> Result<CommandResult> {
        let poll = async {
            loop {
                self.refresh_now().await;
                if let Some(result) = self.result_for(id).await {
                    return result;
                }
                tokio::time::sleep(self.config.poll_interval).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| BridgeError::NotFound(format!("result for command {}", id)))
    }

    /// Read results and status once, outside the polling schedule
    pub async fn refresh_now(&self) {
        refresh(&self.shared, &self.events).await;
    }

    pub async fn status(&self) -> Option<StatusSnapshot> {
        self.shared.lock().await.status.clone()
    }

    pub async fn liveness(&self) -> Liveness {
        let shared = self.shared.lock().await;
        Liveness::from_status(shared.status.as_ref(), now_millis(), self.config.stale_after)
    }

    async fn exchange_dir(&self) -> Result<ExchangeDir> {
        self.path()
            .await
            .map(ExchangeDir::new)
            .ok_or(BridgeError::NotConfigured)
    }
}

impl Drop for BridgeController {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

/// One poll of `results.json` and `status.json`
async fn refresh(shared: &Mutex<Shared>, events: &broadcast::Sender<BridgeEvent>) {
    let Some(path) = shared.lock().await.path.clone() else {
        return;
    };
    let dir = ExchangeDir::new(path);
    let results = read_file_async(&dir.results()).await;
    let status = read_file_async(&dir.status()).await;

    let mut shared = shared.lock().await;
    // Reconfigured while reading
    if shared.path.as_deref() != Some(dir.root()) {
        return;
    }

    if let Some(bytes) = results {
        if shared.results_changes.changed(&bytes) {
            apply_results(&mut shared, &bytes, events);
        }
    }
    if let Some(bytes) = status {
        if shared.status_changes.changed(&bytes) {
            match decode_status(&bytes) {
                Ok(Some(snapshot)) => {
                    let _ = events.send(BridgeEvent::ModStatus(snapshot.clone()));
                    shared.status = Some(snapshot);
                }
                Ok(None) => {}
                Err(e) => debug!("Status not readable yet: {}", e),
            }
        }
    }
}

fn apply_results(shared: &mut Shared, bytes: &[u8], events: &broadcast::Sender<BridgeEvent>) {
    let results = match decode_results(bytes) {
        Ok(results) => results,
        Err(e) => {
            debug!("Results not readable yet: {}", e);
            // Re-read next poll
            shared.results_changes.reset();
            return;
        }
    };
    for result in &results {
        if !shared.seen.contains(&result.id) {
            debug!(
                "[Runtime→Host] result {} success={}",
                result.id, result.success
            );
            let _ = events.send(BridgeEvent::CommandResult(result.clone()));
        }
    }
    // Ids evicted from the log are forgotten with it
    shared.seen = results.iter().map(|r| r.id.clone()).collect();
    shared.results = results;
}
