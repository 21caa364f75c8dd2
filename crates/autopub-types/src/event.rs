//! # Sync Events
//!
//! A replicated mutation travels as an ordinary publish: the operation's
//! arguments are the positional args and the operation name rides in the
//! metadata under [`OPERATION_KEY`].
//!
//! ```text
//! publish(topic, [arg0, arg1, ...], {
//!     "operationName": "set",
//!     "dispatchOptions": { "acknowledge": false, "exclude_me": true, ... }
//! })
//! ```

use crate::entities::PublishOptions;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Metadata key naming the operation to replay.
pub const OPERATION_KEY: &str = "operationName";

/// Metadata key carrying the publish options.
pub const OPTIONS_KEY: &str = "dispatchOptions";

/// Positional arguments of a published event.
pub type EventArgs = Vec<Value>;

/// Keyword metadata of a published event.
pub type EventMetadata = Map<String, Value>;

/// An outbound replicated operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    /// Name of the mutating operation.
    pub operation: String,
    /// Arguments the operation was invoked with.
    pub arguments: EventArgs,
    /// Options the event is dispatched with.
    pub options: PublishOptions,
}

impl SyncEvent {
    /// Create a new event.
    pub fn new(
        operation: impl Into<String>,
        arguments: EventArgs,
        options: PublishOptions,
    ) -> Self {
        Self {
            operation: operation.into(),
            arguments,
            options,
        }
    }

    /// Build the publish metadata for this event.
    #[must_use]
    pub fn metadata(&self) -> EventMetadata {
        let mut metadata = Map::new();
        metadata.insert(OPERATION_KEY.to_string(), Value::String(self.operation.clone()));
        // PublishOptions only holds bools, serialization cannot fail
        let options = serde_json::to_value(&self.options).unwrap_or(Value::Null);
        metadata.insert(OPTIONS_KEY.to_string(), options);
        metadata
    }
}

/// Read the publish options back out of event metadata, if present and well formed.
#[must_use]
pub fn options_from_metadata(metadata: &EventMetadata) -> Option<PublishOptions> {
    metadata
        .get(OPTIONS_KEY)
        .and_then(|value| serde_json::from_value(value.clone()).ok())
}
