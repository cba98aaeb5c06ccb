//! Lifecycle events forwarded to panel subscribers

use panel_bridge_core::{CommandResult, StatusSnapshot};
use serde::Serialize;
use std::path::PathBuf;

/// Event published by the [`BridgeController`](crate::BridgeController)
///
/// Serialized as `{"event": "...", "data": ...}` for the dashboard socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum BridgeEvent {
    Started,
    Stopped,
    Configured { path: PathBuf },
    /// A new heartbeat from the runtime
    ModStatus(StatusSnapshot),
    /// A result not seen in an earlier poll
    CommandResult(CommandResult),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format() {
        assert_eq!(
            serde_json::to_value(BridgeEvent::Started).unwrap(),
            json!({ "event": "started" })
        );
        assert_eq!(
            serde_json::to_value(BridgeEvent::Configured {
                path: PathBuf::from("/srv/bridge")
            })
            .unwrap(),
            json!({ "event": "configured", "data": { "path": "/srv/bridge" } })
        );
    }

    #[test]
    fn test_command_result_payload() {
        let result = CommandResult::failure("c9", "Unknown command: x", 7);
        let json = serde_json::to_value(BridgeEvent::CommandResult(result)).unwrap();
        assert_eq!(json["event"], "commandResult");
        assert_eq!(json["data"]["id"], "c9");
        assert_eq!(json["data"]["success"], false);
    }
}
