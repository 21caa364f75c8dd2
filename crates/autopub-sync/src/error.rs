//! Error types for synchronized containers

use crate::service::JoinState;
use autopub_bus::BusError;
use autopub_types::{PeerId, TopicError};
use thiserror::Error;

/// Errors raised by synchronized containers.
///
/// Local mutation failures abort the operation before anything is
/// published. Per-subscriber publish failures never surface here; they are
/// logged and counted instead.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Cannot {action} while {state}")]
    InvalidState { action: &'static str, state: JoinState },

    #[error("Event metadata is missing required key '{key}'")]
    MissingKey { key: String },

    #[error("Unknown operation: {name}")]
    UnknownOperation { name: String },

    #[error("Invalid arguments for '{operation}': {reason}")]
    InvalidArguments { operation: String, reason: String },

    #[error("Index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    #[error("Value is not JSON serializable: {0}")]
    NotSerializable(String),

    #[error("'{name}' is not a mutating operation of this container")]
    NotAMutator { name: String },

    #[error("Invalid topic: {0}")]
    InvalidTopic(#[from] TopicError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Snapshot call to {topic} timed out after {timeout_ms}ms")]
    CallTimeout { topic: String, timeout_ms: u64 },

    #[error("Peer {peer} is not subscribed")]
    NotSubscribed { peer: PeerId },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Bus error: {0}")]
    Bus(#[from] BusError),
}

impl SyncError {
    pub(crate) fn invalid_arguments(operation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }
}
