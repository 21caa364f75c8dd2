//! Inbound path: replay remote mutations without re-broadcasting them

use crate::domain::{Operation, Replicated};
use crate::error::SyncError;
use crate::service::replica::{Replica, ReplicaInner};
use autopub_bus::{event_handler, procedure_handler, BusError, EventHandler, ProcedureHandler};
use autopub_types::{EventArgs, EventMetadata, OPERATION_KEY};
use serde_json::Value;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

impl<S: Replicated> Replica<S> {
    /// Replay an event published by a remote replica.
    ///
    /// The gate stays closed for the whole replay and the suspension is
    /// released afterwards, even when the replay fails. Concurrent replays
    /// each hold their own suspension.
    pub async fn on_remote_event(
        &self,
        args: EventArgs,
        metadata: &EventMetadata,
    ) -> Result<Option<Value>, SyncError> {
        let name = match metadata.get(OPERATION_KEY) {
            None => {
                return Err(SyncError::MissingKey {
                    key: OPERATION_KEY.to_string(),
                })
            }
            Some(Value::String(name)) => name.as_str(),
            Some(other) => {
                return Err(SyncError::UnknownOperation {
                    name: other.to_string(),
                })
            }
        };
        let op = S::Op::decode(name, args)?;

        let _suspended = self.inner.gate.suspend();
        let result = self.execute(op).await?;
        self.inner.metrics.record_replay();
        debug!(topic = %self.topic(), operation = name, "Replayed remote operation");
        Ok(result)
    }

    /// Bus handler feeding events into [`Self::on_remote_event`].
    ///
    /// Holds the replica weakly; events arriving after the last handle is
    /// dropped fail with a handler error.
    pub(crate) fn event_handler(&self) -> EventHandler {
        let weak = Arc::downgrade(&self.inner);
        event_handler(move |args, metadata| {
            let weak = weak.clone();
            async move {
                let replica = upgrade(&weak)?;
                replica
                    .on_remote_event(args, &metadata)
                    .await
                    .map(|_| ())
                    .map_err(|e| {
                        warn!(topic = %replica.topic(), error = %e, "Rejected remote event");
                        BusError::Handler(e.to_string())
                    })
            }
        })
    }

    /// Bus procedure answering snapshot requests with the current state.
    pub(crate) fn snapshot_procedure(&self) -> ProcedureHandler {
        let weak = Arc::downgrade(&self.inner);
        procedure_handler(move |_args| {
            let weak = weak.clone();
            async move {
                let replica = upgrade(&weak)?;
                let snapshot = replica
                    .to_snapshot()
                    .map_err(|e| BusError::Handler(e.to_string()))?;
                replica.inner.metrics.record_snapshot_served();
                Ok(Value::String(snapshot))
            }
        })
    }
}

fn upgrade<S: Replicated>(weak: &Weak<ReplicaInner<S>>) -> Result<Replica<S>, BusError> {
    weak.upgrade()
        .map(|inner| Replica { inner })
        .ok_or_else(|| BusError::Handler("container has been dropped".to_string()))
}
