//! # Bus Errors

use thiserror::Error;

/// Errors surfaced by bus primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The session's transport went away.
    #[error("Transport lost")]
    TransportLost,

    /// Any other transport failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Another session already registered a procedure at this topic.
    #[error("Procedure already registered: {topic}")]
    ProcedureAlreadyRegistered { topic: String },

    /// Nobody registered a procedure at this topic.
    #[error("No procedure registered at {topic}")]
    NoSuchProcedure { topic: String },

    /// The remote handler failed.
    #[error("Handler failed: {0}")]
    Handler(String),
}

impl BusError {
    /// Whether the failure means the session is no longer usable.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::TransportLost | Self::Transport(_))
    }
}
