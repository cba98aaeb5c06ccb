//! Error types for the panel bridge

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
///
/// Every variant is converted into a failed command result or a logged event
/// close to where it happens. None of them is allowed to escape a poll cycle.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BridgeError {
    /// Required command argument absent
    #[error("Missing argument: {0}")]
    MissingArgument(String),

    /// Argument present but of the wrong shape
    #[error("Invalid argument '{name}': {reason}")]
    InvalidArgument { name: String, reason: String },

    /// No handler registered for the action name
    #[error("Unknown command: {0}")]
    UnknownAction(String),

    /// Neither the primary nor any fallback entry point exists on this host
    #[error("Capability unavailable: {0}")]
    CapabilityUnavailable(String),

    /// An entry point was invoked and faulted
    #[error("{operation} failed: {reason}")]
    HandlerFault { operation: String, reason: String },

    /// Referenced player, vehicle or option does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// File read/write error
    #[error("IO failure: {0}")]
    IoFailure(String),

    /// Malformed shared file
    #[error("Decode failure: {0}")]
    DecodeFailure(String),

    /// Host side used before a bridge path was configured
    #[error("Bridge path not configured")]
    NotConfigured,
}

impl BridgeError {
    /// Shorthand for an invalid argument
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for a faulted entry point
    pub fn fault(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::HandlerFault {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::DecodeFailure(err.to_string())
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::IoFailure(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_action_message() {
        let err = BridgeError::UnknownAction("doesNotExist".into());
        assert_eq!(err.to_string(), "Unknown command: doesNotExist");
    }

    #[test]
    fn test_missing_argument_message() {
        let err = BridgeError::MissingArgument("username".into());
        assert_eq!(err.to_string(), "Missing argument: username");
    }
}
