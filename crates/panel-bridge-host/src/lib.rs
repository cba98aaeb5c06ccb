//! # panel-bridge-host
//!
//! Panel side of the file bridge:
//! - [`resolver`] finds the exchange directory for a server
//! - [`controller`] submits commands, polls results and status, and reports
//!   lifecycle events
//! - [`store`] persists the discovered path between runs
//! - [`rcon`] turns remote-console connections into auto-start triggers

pub mod config;
pub mod controller;
pub mod events;
pub mod fingerprint;
pub mod rcon;
pub mod resolver;
pub mod store;

pub use config::{ControllerConfig, ServerIdentity};
pub use controller::{BridgeController, Liveness};
pub use events::BridgeEvent;
pub use rcon::{RconEvent, watch_rcon};
pub use resolver::{PathResolver, PathSource, PathState, ResolvedPath};
pub use store::{JsonFilePathStore, MemoryPathStore, PathStore};
