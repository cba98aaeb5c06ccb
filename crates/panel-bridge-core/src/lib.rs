//! # panel-bridge-core
//!
//! Core types shared by both ends of the panel file bridge:
//! - Commands and their typed payloads
//! - Command results
//! - Status and startup snapshots
//! - Host-API capabilities
//! - Debug log entries and error types

pub mod args;
pub mod capability;
pub mod command;
pub mod debug;
pub mod error;
pub mod lua;
pub mod result;
pub mod status;

pub use args::Args;
pub use capability::{ApiCapabilitySet, ApiGeneration, Capability};
pub use command::{AccessLevel, Command, CommandId, CommandKind, FromArgs, Location, Position};
pub use debug::{DebugLogEntry, LogLevel};
pub use error::{BridgeError, Result};
pub use result::{CommandResult, Data};
pub use status::{BridgeStats, StartupInfo, StatusSnapshot};

/// Bridge protocol version written into status and startup files
pub const BRIDGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current Unix time in milliseconds
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
