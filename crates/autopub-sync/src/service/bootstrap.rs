//! Bootstrap: attaching a replica to the bus
//!
//! ```text
//! Detached ──join──► Joining ──ok──► Attached
//!                       │
//!                       └─error / cancelled──► Failed
//! ```
//!
//! A join is only accepted from `Detached`. Anything that stops a join short
//! of `Attached`, including the caller dropping the future, leaves the
//! replica `Failed`; such an instance should be discarded.

use crate::domain::Replicated;
use crate::error::SyncError;
use crate::service::replica::Replica;
use autopub_bus::{Registration, Session, Subscription};
use autopub_types::Topic;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Where a replica is in its bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinState {
    Detached,
    Joining,
    Attached,
    Failed,
}

impl fmt::Display for JoinState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detached => write!(f, "detached"),
            Self::Joining => write!(f, "joining"),
            Self::Attached => write!(f, "attached"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// An in-flight join. Marks the replica `Failed` on drop unless completed.
struct JoinAttempt<'a, S: Replicated> {
    replica: &'a Replica<S>,
    topic: Topic,
    completed: bool,
}

impl<'a, S: Replicated> JoinAttempt<'a, S> {
    fn begin(replica: &'a Replica<S>) -> Result<Self, SyncError> {
        let mut binding = replica.inner.binding.lock();
        if binding.state != JoinState::Detached {
            return Err(SyncError::InvalidState {
                action: "join",
                state: binding.state,
            });
        }
        binding.state = JoinState::Joining;
        Ok(Self {
            replica,
            topic: binding.topic.clone(),
            completed: false,
        })
    }

    fn complete(mut self, subscription: Subscription, registration: Option<Registration>) {
        let mut binding = self.replica.inner.binding.lock();
        binding.state = JoinState::Attached;
        binding.subscription = Some(subscription);
        binding.registration = registration;
        self.completed = true;
    }
}

impl<S: Replicated> Drop for JoinAttempt<'_, S> {
    fn drop(&mut self) {
        if !self.completed {
            self.replica.inner.binding.lock().state = JoinState::Failed;
            warn!(topic = %self.topic, "Join did not complete");
        }
    }
}

impl<S: Replicated> Replica<S> {
    /// Attach as the source of truth for this topic.
    ///
    /// Adds `session` as a subscriber, registers the snapshot procedure at
    /// `<topic>.<snapshot_method>` and subscribes to remote events.
    pub async fn join_as_authority(&self, session: &Arc<dyn Session>) -> Result<(), SyncError> {
        let attempt = JoinAttempt::begin(self)?;
        let topic = attempt.topic.clone();

        self.subscribe(session);

        let procedure = topic.join(&self.inner.config.snapshot_method)?;
        let registration = session
            .register(&procedure, self.snapshot_procedure())
            .await?;
        let subscription = session.subscribe(&topic, self.event_handler()).await?;

        attempt.complete(subscription, Some(registration));
        info!(topic = %topic, procedure = %procedure, "Joined as authority");

        if self.inner.config.broadcast_on_join {
            self.broadcast_sync().await?;
        }
        Ok(())
    }

    /// Attach by fetching state from the authority.
    ///
    /// Subscribes to remote events, loads the snapshot returned by
    /// `<topic>.<snapshot_method>` and then adds `session` as a subscriber so
    /// local changes flow back.
    pub async fn join_as_replica(&self, session: &Arc<dyn Session>) -> Result<(), SyncError> {
        let attempt = JoinAttempt::begin(self)?;
        let topic = attempt.topic.clone();

        let subscription = session.subscribe(&topic, self.event_handler()).await?;

        let procedure = topic.join(&self.inner.config.snapshot_method)?;
        let timeout = self.inner.config.call_timeout();
        let response = tokio::time::timeout(timeout, session.call(&procedure, Vec::new()))
            .await
            .map_err(|_| SyncError::CallTimeout {
                topic: procedure.to_string(),
                timeout_ms: self.inner.config.call_timeout_ms,
            })??;
        let snapshot = match response {
            Value::String(snapshot) => snapshot,
            other => {
                return Err(SyncError::MalformedSnapshot(format!(
                    "expected snapshot text, got {other}"
                )))
            }
        };
        self.load_snapshot(&snapshot)?;

        self.subscribe(session);
        attempt.complete(subscription, None);
        info!(topic = %topic, "Joined as replica");
        Ok(())
    }
}
