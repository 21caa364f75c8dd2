//! Outbound path: apply a mutation, then fan it out
//!
//! ```text
//! execute(op)
//!   ├─ apply to store      (failure: return error, nothing published)
//!   ├─ gate closed?        (yes: return result)
//!   └─ for each subscriber in a snapshot of the registry:
//!          publish(topic[.sub_topic], op.arguments(), {operationName, dispatchOptions})
//!          failure: warn + count, keep going
//! ```

use crate::domain::{Operation, Replicated};
use crate::error::SyncError;
use crate::service::replica::Replica;
use autopub_types::SyncEvent;
use serde_json::Value;
use tracing::{debug, warn};

impl<S: Replicated> Replica<S> {
    /// Run a mutating operation through the publish wrapper.
    ///
    /// Returns whatever the operation displaced or removed. Per-subscriber
    /// publish failures are logged and never reported here.
    pub async fn execute(&self, op: S::Op) -> Result<Option<Value>, SyncError> {
        let result = self.apply_local(&op)?;
        if !self.inner.gate.is_enabled() {
            return Ok(result);
        }
        self.propagate(&op).await;
        Ok(result)
    }

    /// Replace the whole state from snapshot text, as a published operation.
    pub async fn apply_string(&self, snapshot: &str) -> Result<(), SyncError> {
        self.execute(S::Op::apply_snapshot(snapshot.to_string()))
            .await
            .map(|_| ())
    }

    /// Publish the full current state to every subscriber.
    ///
    /// Does nothing while propagation is suspended.
    pub async fn broadcast_sync(&self) -> Result<(), SyncError> {
        if !self.inner.gate.is_enabled() {
            return Ok(());
        }
        let snapshot = self.to_snapshot()?;
        self.propagate(&S::Op::apply_snapshot(snapshot)).await;
        Ok(())
    }

    pub(crate) fn apply_local(&self, op: &S::Op) -> Result<Option<Value>, SyncError> {
        let result = self.inner.store.lock().apply(op)?;
        self.inner.metrics.record_mutation();
        Ok(result)
    }

    /// Load snapshot text straight into the store, bypassing the wrapper.
    pub(crate) fn load_snapshot(&self, snapshot: &str) -> Result<(), SyncError> {
        self.inner.store.lock().apply_string(snapshot)
    }

    async fn propagate(&self, op: &S::Op) {
        let name = op.name();
        let spec = self.publish_spec(name);
        let topic = match spec.resolve(&self.topic()) {
            Ok(topic) => topic,
            Err(e) => {
                // Sub-topics are validated up front, so this only trips on
                // a topic that became too odd to extend.
                warn!(operation = name, error = %e, "Cannot resolve publish topic");
                self.inner.metrics.record_publish_failure();
                return;
            }
        };

        let event = SyncEvent::new(name, op.arguments(), spec.options().clone());
        let metadata = event.metadata();
        let subscribers = self.inner.registry.lock().snapshot();

        debug!(
            topic = %topic,
            operation = name,
            subscribers = subscribers.len(),
            "Propagating mutation"
        );

        for session in subscribers {
            match session
                .publish(&topic, event.arguments.clone(), metadata.clone())
                .await
            {
                Ok(()) => self.inner.metrics.record_published(),
                Err(e) => {
                    warn!(
                        topic = %topic,
                        operation = name,
                        peer = %session.peer_id(),
                        error = %e,
                        "Publish to subscriber failed"
                    );
                    self.inner.metrics.record_publish_failure();
                }
            }
        }
    }
}
