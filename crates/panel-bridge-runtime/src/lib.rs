//! # panel-bridge-runtime
//!
//! Server side of the panel file bridge. Runs inside the game server's
//! scripting environment, which cannot open sockets, and talks to the panel
//! only through the shared exchange directory:
//! - [`processor`] reads `commands.json`, dispatches and writes `results.json`
//! - [`status`] rewrites `status.json` as a heartbeat
//! - [`handlers`] holds the closed catalog of operations
//! - [`probe`] decides, once, which host entry points exist
//!
//! The game server is abstracted as [`HostApi`]; [`sim::SimulatedServer`] is
//! an in-memory implementation for tests and local runs.

pub mod config;
pub mod debug_log;
pub mod dedupe;
pub mod handlers;
pub mod host;
pub mod probe;
pub mod processor;
pub mod runtime;
pub mod sim;
pub mod state;
pub mod status;

pub use config::RuntimeConfig;
pub use debug_log::DebugLog;
pub use dedupe::ProcessedIdSet;
pub use host::{HostApi, HostFault, HostResult};
pub use processor::{CommandProcessor, PollOutcome};
pub use runtime::BridgeRuntime;
pub use sim::SimulatedServer;
pub use state::BridgeState;
pub use status::StatusPublisher;
