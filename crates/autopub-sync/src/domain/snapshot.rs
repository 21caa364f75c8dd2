//! Serialization boundary
//!
//! Every synchronizable store renders itself as snapshot text and can be
//! replaced from such text. The contract:
//!
//! - `apply_string(to_snapshot())` leaves the store unchanged
//! - a failed `apply_string` leaves the store untouched (parse, then swap)

use crate::domain::operation::Operation;
use crate::error::SyncError;
use serde_json::Value;

/// Snapshot text in and out.
pub trait Snapshot {
    /// Encode the whole store.
    fn to_snapshot(&self) -> Result<String, SyncError>;

    /// Replace the whole store from snapshot text.
    fn apply_string(&mut self, snapshot: &str) -> Result<(), SyncError>;
}

/// A backing store whose mutations can be replicated.
pub trait Replicated: Snapshot + Send + 'static {
    /// The variant's closed operation set.
    type Op: Operation;

    /// Apply one operation to local state.
    ///
    /// Returns the value the operation displaced or removed, if any.
    fn apply(&mut self, op: &Self::Op) -> Result<Option<Value>, SyncError>;
}

/// Encode any value as snapshot text.
pub(crate) fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<String, SyncError> {
    serde_json::to_string(value).map_err(|e| SyncError::Serialization(e.to_string()))
}

/// Convert a caller-supplied value before any mutation happens.
pub(crate) fn to_value<T: serde::Serialize + ?Sized>(value: &T) -> Result<Value, SyncError> {
    serde_json::to_value(value).map_err(|e| SyncError::NotSerializable(e.to_string()))
}
