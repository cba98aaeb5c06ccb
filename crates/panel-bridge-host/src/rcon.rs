//! Remote-console connection events as auto-start triggers
//!
//! The RCON client itself lives elsewhere in the panel. All the bridge needs
//! from it is to hear about fresh connections, which usually mean the game
//! server (and so the runtime) has just come up.

use crate::controller::BridgeController;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RconEvent {
    Connected,
    Disconnected,
}

/// Try an auto-start on every `connected` event until the sender goes away
pub fn watch_rcon(
    controller: Arc<BridgeController>,
    mut events: broadcast::Receiver<RconEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(RconEvent::Connected) => {
                    info!("RCON connected, attempting bridge auto-start");
                    if let Err(e) = controller.auto_start().await {
                        warn!("Bridge auto-start failed: {}", e);
                    }
                }
                Ok(RconEvent::Disconnected) => {
                    // The bridge does not depend on RCON; keep polling
                    debug!("RCON disconnected");
                }
                Err(RecvError::Lagged(missed)) => {
                    debug!("Missed {} RCON events", missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}
