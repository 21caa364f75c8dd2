//! Replica: a backing store plus the synchronization behaviour around it
//!
//! A `Replica<S>` is a cheap, clonable handle. Clones share one store, one
//! propagation gate, one subscriber registry and one bus binding.
//!
//! The outbound path lives in `publisher.rs`, the inbound path in
//! `receiver.rs` and the join state machine in `bootstrap.rs`; this file
//! holds construction, topic handling and the subscriber set.

use crate::config::SyncConfig;
use crate::domain::{
    Operation, PropagationGate, PublishSpec, Replicated, SubscriberRegistry, SuspendGuard,
};
use crate::error::SyncError;
use crate::metrics::{MetricsSnapshot, SyncMetrics};
use crate::service::bootstrap::JoinState;
use autopub_bus::{Registration, Session, Subscription};
use autopub_types::{PeerId, Topic};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Where a replica sits on the bus.
pub(crate) struct Binding {
    pub(crate) topic: Topic,
    pub(crate) state: JoinState,
    pub(crate) subscription: Option<Subscription>,
    pub(crate) registration: Option<Registration>,
}

pub(crate) struct ReplicaInner<S: Replicated> {
    pub(crate) store: Mutex<S>,
    pub(crate) gate: PropagationGate,
    pub(crate) registry: Mutex<SubscriberRegistry>,
    pub(crate) binding: Mutex<Binding>,
    pub(crate) specs: Mutex<HashMap<&'static str, PublishSpec>>,
    pub(crate) config: SyncConfig,
    pub(crate) metrics: SyncMetrics,
}

/// Handle to a synchronized store.
pub struct Replica<S: Replicated> {
    pub(crate) inner: Arc<ReplicaInner<S>>,
}

impl<S: Replicated> Clone for Replica<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<S: Replicated> fmt::Debug for Replica<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let binding = self.inner.binding.lock();
        f.debug_struct("Replica")
            .field("topic", &binding.topic)
            .field("state", &binding.state)
            .field("subscribers", &self.inner.registry.lock().len())
            .finish()
    }
}

impl<S: Replicated> Replica<S> {
    /// Wrap a store. The replica starts detached with the gate open.
    pub fn new(store: S, config: SyncConfig) -> Result<Self, SyncError> {
        config.validate()?;
        let topic = config.topic()?;
        debug!(topic = %topic, "Replica created");
        Ok(Self {
            inner: Arc::new(ReplicaInner {
                store: Mutex::new(store),
                gate: PropagationGate::new(),
                registry: Mutex::new(SubscriberRegistry::new()),
                binding: Mutex::new(Binding {
                    topic,
                    state: JoinState::Detached,
                    subscription: None,
                    registration: None,
                }),
                specs: Mutex::new(HashMap::new()),
                config,
                metrics: SyncMetrics::new(),
            }),
        })
    }

    /// Publish `operation` with its own sub-topic and options.
    ///
    /// Fails with `NotAMutator` when the name is not one of this variant's
    /// mutating operations.
    pub fn with_publish_spec(self, operation: &str, spec: PublishSpec) -> Result<Self, SyncError> {
        let name = S::Op::NAMES
            .iter()
            .copied()
            .find(|name| *name == operation)
            .ok_or_else(|| SyncError::NotAMutator {
                name: operation.to_string(),
            })?;
        self.inner.specs.lock().insert(name, spec);
        Ok(self)
    }

    /// The publish settings for one operation.
    #[must_use]
    pub fn publish_spec(&self, operation: &str) -> PublishSpec {
        self.inner
            .specs
            .lock()
            .get(operation)
            .cloned()
            .unwrap_or_else(|| PublishSpec::new(self.inner.config.publish_options.clone()))
    }

    #[must_use]
    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }

    /// The container topic.
    #[must_use]
    pub fn topic(&self) -> Topic {
        self.inner.binding.lock().topic.clone()
    }

    /// Rebind to another topic. Only allowed before joining.
    pub fn set_topic(&self, topic: Topic) -> Result<(), SyncError> {
        let mut binding = self.inner.binding.lock();
        if binding.topic == topic {
            return Ok(());
        }
        if matches!(binding.state, JoinState::Joining | JoinState::Attached) {
            return Err(SyncError::InvalidState {
                action: "change topic",
                state: binding.state,
            });
        }
        debug!(from = %binding.topic, to = %topic, "Topic changed");
        binding.topic = topic;
        Ok(())
    }

    /// Rebind under a new base URI, keeping the configured object name.
    pub fn set_base_uri(&self, base_uri: &str) -> Result<(), SyncError> {
        let topic = Topic::from_parts(base_uri, &self.inner.config.name)?;
        self.set_topic(topic)
    }

    /// Bootstrap state.
    #[must_use]
    pub fn state(&self) -> JoinState {
        self.inner.binding.lock().state
    }

    /// Whether a join completed. Never reverts once true.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state() == JoinState::Attached
    }

    /// Whether local mutations currently publish.
    #[must_use]
    pub fn is_propagating(&self) -> bool {
        self.inner.gate.is_enabled()
    }

    /// Stop publishing until the guard is dropped.
    ///
    /// ```ignore
    /// let _quiet = list.block_propagation();
    /// list.delete_at(0).await?; // applied locally only
    /// ```
    #[must_use = "propagation resumes as soon as the guard is dropped"]
    pub fn block_propagation(&self) -> SuspendGuard<'_> {
        self.inner.gate.suspend()
    }

    /// Run synchronous code with propagation suspended.
    pub fn with_suspended<R>(&self, action: impl FnOnce() -> R) -> R {
        self.inner.gate.with_suspended(action)
    }

    /// Add a session to the subscriber set (held weakly).
    pub fn subscribe(&self, session: &Arc<dyn Session>) -> bool {
        let added = self.inner.registry.lock().add(session);
        debug!(topic = %self.topic(), peer = %session.peer_id(), added, "Subscriber added");
        added
    }

    /// Remove a subscriber; fails if it is not subscribed.
    pub fn unsubscribe(&self, peer: &PeerId) -> Result<(), SyncError> {
        if self.inner.registry.lock().remove(peer) {
            debug!(topic = %self.topic(), peer = %peer, "Subscriber removed");
            Ok(())
        } else {
            Err(SyncError::NotSubscribed { peer: *peer })
        }
    }

    /// Disconnect hook: drop a peer the bus reports as gone.
    pub fn peer_disconnected(&self, peer: &PeerId) -> bool {
        let removed = self.inner.registry.lock().remove(peer);
        if removed {
            debug!(topic = %self.topic(), peer = %peer, "Subscriber disconnected");
        }
        removed
    }

    /// Live subscriber ids.
    #[must_use]
    pub fn subscribers(&self) -> Vec<PeerId> {
        self.inner.registry.lock().peers()
    }

    /// Read the store without publishing anything.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.store.lock())
    }

    /// Encode the current state.
    pub fn to_snapshot(&self) -> Result<String, SyncError> {
        self.inner.store.lock().to_snapshot()
    }

    #[must_use]
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }
}
