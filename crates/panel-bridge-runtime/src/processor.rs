//! Command processor
//!
//! One poll cycle reads `commands.json`, dispatches every command it has not
//! seen before, appends the results to the bounded result log and clears the
//! command file. Nothing that goes wrong inside a cycle escapes it: decode
//! errors, handler failures and even handler panics become failed results or
//! debug-log entries.

use crate::config::RuntimeConfig;
use crate::dedupe::ProcessedIdSet;
use crate::handlers::{HandlerContext, dispatch};
use crate::host::HostApi;
use crate::state::BridgeState;
use panel_bridge_core::{ApiCapabilitySet, BridgeError, Command, CommandResult};
use panel_bridge_protocol::{
    EMPTY_BATCH, ExchangeDir, decode_command_batch, decode_results, encode_results, read_file,
    write_atomic,
};
use serde_json::json;
use std::any::Any;
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;
use tracing::{debug, warn};

/// What one call to [`CommandProcessor::poll`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Poll interval has not elapsed
    NotDue,
    /// Command file missing, empty or undecodable
    NoCommands,
    Processed { dispatched: usize, skipped: usize },
}

#[derive(Debug)]
pub struct CommandProcessor {
    dir: ExchangeDir,
    poll_interval_ms: u64,
    last_poll: Option<u64>,
    processed: ProcessedIdSet,
    results: VecDeque<CommandResult>,
    result_capacity: usize,
}

impl CommandProcessor {
    /// Create a processor, picking up the result log a previous run left behind
    pub fn new(dir: ExchangeDir, config: &RuntimeConfig) -> Self {
        let result_capacity = config.result_capacity.max(1);
        let mut processor = Self {
            dir,
            poll_interval_ms: config.poll_interval.as_millis() as u64,
            last_poll: None,
            processed: ProcessedIdSet::new(config.dedupe_capacity),
            results: VecDeque::with_capacity(result_capacity + 1),
            result_capacity,
        };
        processor.load_results();
        processor
    }

    fn load_results(&mut self) {
        let Some(bytes) = read_file(&self.dir.results()) else {
            return;
        };
        match decode_results(&bytes) {
            Ok(results) => {
                for result in results {
                    self.processed.insert(&result.id);
                    self.push_result(result);
                }
                self.processed.trim();
                debug!("Loaded {} retained results", self.results.len());
            }
            Err(e) => warn!("Ignoring unreadable result log: {}", e),
        }
    }

    pub fn is_due(&self, now: u64) -> bool {
        match self.last_poll {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.poll_interval_ms,
        }
    }

    /// Run a cycle if the poll interval has elapsed
    pub fn poll(
        &mut self,
        host: &mut dyn HostApi,
        caps: &ApiCapabilitySet,
        state: &mut BridgeState,
        now: u64,
    ) -> PollOutcome {
        if !self.is_due(now) {
            return PollOutcome::NotDue;
        }
        self.last_poll = Some(now);
        self.process_pending(host, caps, state, now)
    }

    /// Run a cycle now, regardless of the poll interval
    pub fn process_pending(
        &mut self,
        host: &mut dyn HostApi,
        caps: &ApiCapabilitySet,
        state: &mut BridgeState,
        now: u64,
    ) -> PollOutcome {
        let Some(bytes) = read_file(&self.dir.commands()) else {
            return PollOutcome::NoCommands;
        };
        let batch = match decode_command_batch(&bytes) {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Unreadable command file: {}", e);
                return PollOutcome::NoCommands;
            }
        };
        if batch.entries == 0 {
            return PollOutcome::NoCommands;
        }
        if batch.skipped() > 0 {
            state.debug.warn(
                "Dropped malformed commands",
                json!({ "dropped": batch.skipped(), "entries": batch.entries }),
            );
        }
        let commands = batch.commands;

        let preview: String = String::from_utf8_lossy(&bytes).chars().take(200).collect();
        debug!("[Host→Runtime] len={} json={}", bytes.len(), preview);

        let mut dispatched = 0;
        let mut skipped = 0;
        for command in &commands {
            if !self.processed.insert(&command.id) {
                debug!("Skipping already processed command {}", command.id);
                skipped += 1;
                continue;
            }
            let mut ctx = HandlerContext {
                host: &mut *host,
                caps,
                state: &mut *state,
                now,
            };
            let result = execute(command, &mut ctx);
            state.stats.record(result.success);
            state.last_command_at = Some(now);
            self.push_result(result);
            dispatched += 1;
        }

        if dispatched > 0 {
            self.write_results(state);
        }

        // Cleared even when every entry was a duplicate
        if let Err(e) = write_atomic(&self.dir.commands(), EMPTY_BATCH) {
            state
                .debug
                .error("Failed to clear command file", json!({ "error": e.to_string() }));
        }

        let evicted = self.processed.trim();
        if evicted > 0 {
            state.debug.debug(
                "Processed id cache trimmed",
                json!({ "evicted": evicted, "retained": self.processed.len() }),
            );
        }

        PollOutcome::Processed {
            dispatched,
            skipped,
        }
    }

    fn push_result(&mut self, result: CommandResult) {
        self.results.push_back(result);
        while self.results.len() > self.result_capacity {
            self.results.pop_front();
        }
    }

    fn write_results(&mut self, state: &mut BridgeState) {
        let written = encode_results(self.results.make_contiguous())
            .and_then(|bytes| write_atomic(&self.dir.results(), &bytes));
        if let Err(e) = written {
            state
                .debug
                .error("Failed to write results", json!({ "error": e.to_string() }));
        }
    }

    /// Retained results, oldest first
    pub fn results(&self) -> impl Iterator<Item = &CommandResult> {
        self.results.iter()
    }

    pub fn processed(&self) -> &ProcessedIdSet {
        &self.processed
    }
}

/// Decode and dispatch one command, timing it and turning every failure,
/// including a panic inside the handler, into a failed result
pub fn execute(command: &Command, ctx: &mut HandlerContext<'_>) -> CommandResult {
    let started = Instant::now();
    let outcome = command.decode().and_then(|kind| {
        panic::catch_unwind(AssertUnwindSafe(|| dispatch(kind, ctx))).unwrap_or_else(|payload| {
            Err(BridgeError::fault(
                command.action.clone(),
                panic_message(payload.as_ref()),
            ))
        })
    });
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    match outcome {
        Ok(data) => {
            ctx.state.debug.debug(
                "Command succeeded",
                json!({ "id": command.id, "action": command.action, "durationMs": duration_ms }),
            );
            CommandResult::success(command.id.clone(), data, ctx.now)
        }
        Err(e) => {
            let error = e.to_string();
            ctx.state.debug.warn(
                "Command failed",
                json!({
                    "id": command.id,
                    "action": command.action,
                    "error": error,
                    "durationMs": duration_ms,
                }),
            );
            CommandResult::failure(command.id.clone(), error, ctx.now)
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug_log::DebugLog;
    use crate::probe::detect;
    use crate::sim::SimulatedServer;
    use panel_bridge_core::{Args, Position};
    use panel_bridge_protocol::encode_commands;
    use std::time::Duration;
    use tempfile::TempDir;

    struct Fixture {
        _tmp: TempDir,
        dir: ExchangeDir,
        host: SimulatedServer,
        caps: ApiCapabilitySet,
        state: BridgeState,
        processor: CommandProcessor,
    }

    impl Fixture {
        fn new() -> Self {
            let tmp = TempDir::new().unwrap();
            let dir = ExchangeDir::new(tmp.path());
            let config = RuntimeConfig::with_dir(tmp.path(), "servertest");
            let host = SimulatedServer::modern("servertest")
                .with_player("Bob", Position::new(100.0, 200.0, 0.0));
            let caps = detect(&host);
            let state = BridgeState::new("servertest", tmp.path().to_path_buf(), DebugLog::default(), 0);
            let processor = CommandProcessor::new(dir.clone(), &config);
            Self {
                _tmp: tmp,
                dir,
                host,
                caps,
                state,
                processor,
            }
        }

        fn submit(&self, commands: &[Command]) {
            write_atomic(&self.dir.commands(), &encode_commands(commands).unwrap()).unwrap();
        }

        fn cycle(&mut self) -> PollOutcome {
            self.processor
                .process_pending(&mut self.host, &self.caps, &mut self.state, 5_000)
        }

        fn results_on_disk(&self) -> Vec<CommandResult> {
            decode_results(&read_file(&self.dir.results()).unwrap()).unwrap()
        }
    }

    fn ping(id: &str) -> Command {
        Command::new(id, "ping", Args::new())
    }

    #[test]
    fn test_ping_round_trip() {
        let mut fx = Fixture::new();
        fx.submit(&[ping("c1")]);

        let outcome = fx.cycle();
        assert_eq!(
            outcome,
            PollOutcome::Processed {
                dispatched: 1,
                skipped: 0
            }
        );

        let results = fx.results_on_disk();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "c1");
        assert!(results[0].success);
        assert_eq!(results[0].field("message").unwrap(), "pong");
        assert_eq!(read_file(&fx.dir.commands()).unwrap(), EMPTY_BATCH);
        assert_eq!(fx.state.stats.processed, 1);
        assert_eq!(fx.state.last_command_at, Some(5_000));
    }

    #[test]
    fn test_resubmitted_id_not_dispatched_but_file_cleared() {
        let mut fx = Fixture::new();
        fx.submit(&[ping("c1")]);
        fx.cycle();

        fx.submit(&[ping("c1")]);
        let outcome = fx.cycle();
        assert_eq!(
            outcome,
            PollOutcome::Processed {
                dispatched: 0,
                skipped: 1
            }
        );
        assert_eq!(fx.state.stats.processed, 1);
        assert_eq!(fx.results_on_disk().len(), 1);
        assert_eq!(read_file(&fx.dir.commands()).unwrap(), EMPTY_BATCH);
    }

    #[test]
    fn test_no_op_on_missing_or_empty_file() {
        let mut fx = Fixture::new();
        assert_eq!(fx.cycle(), PollOutcome::NoCommands);
        assert!(read_file(&fx.dir.results()).is_none());

        write_atomic(&fx.dir.commands(), EMPTY_BATCH).unwrap();
        assert_eq!(fx.cycle(), PollOutcome::NoCommands);

        write_atomic(&fx.dir.commands(), b"{not json").unwrap();
        assert_eq!(fx.cycle(), PollOutcome::NoCommands);
        assert_eq!(fx.state.stats.processed, 0);
    }

    #[test]
    fn test_all_malformed_batch_is_cleared() {
        let mut fx = Fixture::new();
        write_atomic(&fx.dir.commands(), br#"{"commands":[{"action":"ping","args":{}}]}"#).unwrap();

        assert_eq!(
            fx.cycle(),
            PollOutcome::Processed {
                dispatched: 0,
                skipped: 0
            }
        );
        assert_eq!(read_file(&fx.dir.commands()).unwrap(), EMPTY_BATCH);
        assert!(read_file(&fx.dir.results()).is_none());
        assert_eq!(fx.state.stats.processed, 0);
        assert_eq!(fx.cycle(), PollOutcome::NoCommands);
    }

    #[test]
    fn test_unknown_action_fails_and_counts() {
        let mut fx = Fixture::new();
        fx.submit(&[Command::new("x1", "doesNotExist", Args::new())]);
        fx.cycle();

        let results = fx.results_on_disk();
        assert!(!results[0].success);
        assert_eq!(results[0].error.as_deref(), Some("Unknown command: doesNotExist"));
        assert_eq!(fx.state.stats.failed, 1);
        assert_eq!(fx.state.stats.succeeded, 0);
    }

    #[test]
    fn test_batch_order_preserved() {
        let mut fx = Fixture::new();
        fx.submit(&[
            ping("a"),
            Command::new("b", "getPlayer", Args::new().with("username", "Bob")),
            Command::new("c", "getPlayer", Args::new()),
        ]);
        fx.cycle();

        let results = fx.results_on_disk();
        let ids: Vec<_> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert!(results[1].success);
        assert_eq!(results[2].error.as_deref(), Some("Missing argument: username"));
    }

    #[test]
    fn test_result_log_keeps_last_fifty() {
        let mut fx = Fixture::new();
        for round in 0..6 {
            let batch: Vec<_> = (round * 10..round * 10 + 10)
                .map(|i| ping(&format!("c{}", i)))
                .collect();
            fx.submit(&batch);
            fx.cycle();
        }

        let results = fx.results_on_disk();
        assert_eq!(results.len(), 50);
        assert_eq!(fx.processor.results().count(), 50);
        assert_eq!(results[0].id, "c10");
        assert_eq!(results[49].id, "c59");
        assert_eq!(fx.state.stats.processed, 60);
    }

    #[test]
    fn test_processed_ids_trimmed_oldest_first() {
        let mut fx = Fixture::new();
        let batch: Vec<_> = (0..120).map(|i| ping(&format!("c{}", i))).collect();
        fx.submit(&batch);
        fx.cycle();

        assert_eq!(fx.processor.processed().len(), 100);
        assert!(!fx.processor.processed().contains("c19"));
        assert!(fx.processor.processed().contains("c20"));
    }

    #[test]
    fn test_poll_respects_interval() {
        let mut fx = Fixture::new();
        let config = RuntimeConfig::with_dir(fx.dir.root(), "servertest")
            .with_poll_interval(Duration::from_millis(500));
        let mut processor = CommandProcessor::new(fx.dir.clone(), &config);

        assert_eq!(
            processor.poll(&mut fx.host, &fx.caps, &mut fx.state, 1_000),
            PollOutcome::NoCommands
        );
        assert_eq!(
            processor.poll(&mut fx.host, &fx.caps, &mut fx.state, 1_200),
            PollOutcome::NotDue
        );
        assert_eq!(
            processor.poll(&mut fx.host, &fx.caps, &mut fx.state, 1_500),
            PollOutcome::NoCommands
        );
    }

    #[test]
    fn test_restart_keeps_result_log_and_ids() {
        let mut fx = Fixture::new();
        fx.submit(&[ping("c1")]);
        fx.cycle();

        let config = RuntimeConfig::with_dir(fx.dir.root(), "servertest");
        let restarted = CommandProcessor::new(fx.dir.clone(), &config);
        assert_eq!(restarted.results().count(), 1);
        assert!(restarted.processed().contains("c1"));
    }

    #[test]
    fn test_handler_fault_becomes_failed_result() {
        let mut fx = Fixture::new();
        fx.host = SimulatedServer::modern("servertest").failing(panel_bridge_core::Capability::SaveWorld);
        fx.caps = detect(&fx.host);
        fx.submit(&[Command::new("s1", "saveWorld", Args::new())]);
        fx.cycle();

        let results = fx.results_on_disk();
        assert!(!results[0].success);
        assert!(results[0].error.as_deref().unwrap().starts_with("world.save failed"));
    }
}
