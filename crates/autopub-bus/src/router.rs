//! # In-Memory Router
//!
//! A loopback broker connecting sessions inside one process.
//!
//! Suitable for single-process operation and tests; a deployment talking to
//! a real router would provide its own [`Session`] implementation.
//!
//! ## Delivery
//!
//! - Events are delivered to exact-topic subscribers in subscription order.
//! - The publishing session is skipped when `exclude_me` is set in the
//!   event's dispatch options (the default).
//! - A failing event handler is logged and does not affect the publisher.

use crate::error::BusError;
use crate::handles::{Registration, Subscription};
use crate::session::{EventHandler, ProcedureHandler, Session};
use async_trait::async_trait;
use autopub_types::event::options_from_metadata;
use autopub_types::{EventArgs, EventMetadata, PeerId, Topic};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

/// Callback fired when a session leaves the router.
pub type DisconnectListener = Arc<dyn Fn(PeerId) + Send + Sync>;

struct SubscriptionEntry {
    topic: Topic,
    peer: PeerId,
    handler: EventHandler,
}

struct ProcedureEntry {
    id: u64,
    peer: PeerId,
    handler: ProcedureHandler,
}

#[derive(Default)]
struct RouterState {
    sessions: HashSet<PeerId>,
    subscriptions: HashMap<u64, SubscriptionEntry>,
    procedures: HashMap<Topic, ProcedureEntry>,
    listeners: Vec<DisconnectListener>,
}

#[derive(Default)]
struct RouterInner {
    state: Mutex<RouterState>,
    next_id: AtomicU64,
    events_published: AtomicU64,
}

impl RouterInner {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn ensure_connected(&self, peer: PeerId) -> Result<(), BusError> {
        if self.state.lock().sessions.contains(&peer) {
            Ok(())
        } else {
            Err(BusError::TransportLost)
        }
    }

    fn leave(&self, peer: PeerId) {
        let (removed_subs, removed_procs, listeners) = {
            let mut state = self.state.lock();
            if !state.sessions.remove(&peer) {
                return;
            }
            let sub_ids: Vec<u64> = state
                .subscriptions
                .iter()
                .filter(|(_, entry)| entry.peer == peer)
                .map(|(id, _)| *id)
                .collect();
            let removed_subs: Vec<SubscriptionEntry> = sub_ids
                .iter()
                .filter_map(|id| state.subscriptions.remove(id))
                .collect();
            let proc_topics: Vec<Topic> = state
                .procedures
                .iter()
                .filter(|(_, entry)| entry.peer == peer)
                .map(|(topic, _)| topic.clone())
                .collect();
            let removed_procs: Vec<ProcedureEntry> = proc_topics
                .iter()
                .filter_map(|topic| state.procedures.remove(topic))
                .collect();
            (removed_subs, removed_procs, state.listeners.clone())
        };

        info!(
            peer = %peer,
            subscriptions = removed_subs.len(),
            procedures = removed_procs.len(),
            "Session left router"
        );

        // Entries are dropped outside the lock
        drop(removed_subs);
        drop(removed_procs);

        for listener in listeners {
            listener(peer);
        }
    }
}

/// Loopback broker for sessions living in the same process.
#[derive(Clone, Default)]
pub struct InMemoryRouter {
    inner: Arc<RouterInner>,
}

impl InMemoryRouter {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new session on this router.
    #[must_use]
    pub fn join(&self) -> Arc<LocalSession> {
        let peer = PeerId::random();
        self.inner.state.lock().sessions.insert(peer);
        debug!(peer = %peer, "Session joined router");
        Arc::new(LocalSession {
            peer,
            router: self.inner.clone(),
        })
    }

    /// Disconnect a session, dropping its subscriptions and procedures and
    /// notifying disconnect listeners.
    pub fn leave(&self, peer: PeerId) {
        self.inner.leave(peer);
    }

    /// Be told whenever a session leaves.
    pub fn add_disconnect_listener(&self, listener: DisconnectListener) {
        self.inner.state.lock().listeners.push(listener);
    }

    /// Whether the session is still attached.
    #[must_use]
    pub fn is_connected(&self, peer: PeerId) -> bool {
        self.inner.state.lock().sessions.contains(&peer)
    }

    /// Number of open sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.inner.state.lock().sessions.len()
    }

    /// Number of active subscriptions across all sessions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.inner.state.lock().subscriptions.len()
    }

    /// Number of registered procedures.
    #[must_use]
    pub fn procedure_count(&self) -> usize {
        self.inner.state.lock().procedures.len()
    }

    /// Total events published through this router.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.inner.events_published.load(Ordering::Relaxed)
    }
}

/// A session opened on an [`InMemoryRouter`].
///
/// Dropping the session disconnects it.
pub struct LocalSession {
    peer: PeerId,
    router: Arc<RouterInner>,
}

impl LocalSession {
    /// Disconnect from the router.
    pub fn close(&self) {
        self.router.leave(self.peer);
    }
}

impl Drop for LocalSession {
    fn drop(&mut self) {
        self.router.leave(self.peer);
    }
}

#[async_trait]
impl Session for LocalSession {
    fn peer_id(&self) -> PeerId {
        self.peer
    }

    async fn publish(
        &self,
        topic: &Topic,
        args: EventArgs,
        metadata: EventMetadata,
    ) -> Result<(), BusError> {
        self.router.ensure_connected(self.peer)?;
        let exclude_me = options_from_metadata(&metadata)
            .unwrap_or_default()
            .exclude_me;

        let handlers: Vec<(u64, EventHandler)> = {
            let state = self.router.state.lock();
            let mut matching: Vec<(u64, EventHandler)> = state
                .subscriptions
                .iter()
                .filter(|(_, entry)| &entry.topic == topic)
                .filter(|(_, entry)| !(exclude_me && entry.peer == self.peer))
                .map(|(id, entry)| (*id, entry.handler.clone()))
                .collect();
            matching.sort_by_key(|(id, _)| *id);
            matching
        };

        self.router.events_published.fetch_add(1, Ordering::Relaxed);
        debug!(
            topic = %topic,
            publisher = %self.peer,
            receivers = handlers.len(),
            "Event published"
        );

        for (id, handler) in handlers {
            if let Err(e) = handler(args.clone(), metadata.clone()).await {
                warn!(topic = %topic, subscription = id, error = %e, "Event handler failed");
            }
        }
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &Topic,
        handler: EventHandler,
    ) -> Result<Subscription, BusError> {
        self.router.ensure_connected(self.peer)?;
        let id = self.router.next_id();
        self.router.state.lock().subscriptions.insert(
            id,
            SubscriptionEntry {
                topic: topic.clone(),
                peer: self.peer,
                handler,
            },
        );
        debug!(topic = %topic, peer = %self.peer, subscription = id, "Subscribed");

        let router: Weak<RouterInner> = Arc::downgrade(&self.router);
        Ok(Subscription::new(id, topic.clone(), move || {
            if let Some(router) = router.upgrade() {
                let removed = router.state.lock().subscriptions.remove(&id);
                drop(removed);
            }
        }))
    }

    async fn register(
        &self,
        topic: &Topic,
        handler: ProcedureHandler,
    ) -> Result<Registration, BusError> {
        self.router.ensure_connected(self.peer)?;
        let id = self.router.next_id();
        {
            let mut state = self.router.state.lock();
            if state.procedures.contains_key(topic) {
                return Err(BusError::ProcedureAlreadyRegistered {
                    topic: topic.to_string(),
                });
            }
            state.procedures.insert(
                topic.clone(),
                ProcedureEntry {
                    id,
                    peer: self.peer,
                    handler,
                },
            );
        }
        debug!(topic = %topic, peer = %self.peer, registration = id, "Procedure registered");

        let router: Weak<RouterInner> = Arc::downgrade(&self.router);
        let key = topic.clone();
        Ok(Registration::new(id, topic.clone(), move || {
            if let Some(router) = router.upgrade() {
                let mut state = router.state.lock();
                // A later registration may have reused the topic
                if state.procedures.get(&key).map(|entry| entry.id) == Some(id) {
                    let removed = state.procedures.remove(&key);
                    drop(state);
                    drop(removed);
                }
            }
        }))
    }

    async fn call(&self, topic: &Topic, args: EventArgs) -> Result<Value, BusError> {
        self.router.ensure_connected(self.peer)?;
        let handler = self
            .router
            .state
            .lock()
            .procedures
            .get(topic)
            .map(|entry| entry.handler.clone())
            .ok_or_else(|| BusError::NoSuchProcedure {
                topic: topic.to_string(),
            })?;
        debug!(topic = %topic, caller = %self.peer, "Calling procedure");
        handler(args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{event_handler, procedure_handler};
    use autopub_types::{PublishOptions, SyncEvent};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn topic(s: &str) -> Topic {
        Topic::new(s).unwrap()
    }

    fn counting_handler(counter: Arc<AtomicUsize>) -> EventHandler {
        event_handler(move |_args, _metadata| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
    }

    #[tokio::test]
    async fn test_publish_reaches_other_sessions_only() {
        let router = InMemoryRouter::new();
        let a = router.join();
        let b = router.join();
        let hits_a = Arc::new(AtomicUsize::new(0));
        let hits_b = Arc::new(AtomicUsize::new(0));

        let _sa = a.subscribe(&topic("com.t"), counting_handler(hits_a.clone())).await.unwrap();
        let _sb = b.subscribe(&topic("com.t"), counting_handler(hits_b.clone())).await.unwrap();

        let event = SyncEvent::new("set", vec![], PublishOptions::default());
        a.publish(&topic("com.t"), vec![], event.metadata()).await.unwrap();

        assert_eq!(hits_a.load(Ordering::SeqCst), 0);
        assert_eq!(hits_b.load(Ordering::SeqCst), 1);
        assert_eq!(router.events_published(), 1);
    }

    #[tokio::test]
    async fn test_publish_to_self_when_not_excluded() {
        let router = InMemoryRouter::new();
        let a = router.join();
        let hits = Arc::new(AtomicUsize::new(0));
        let _sa = a.subscribe(&topic("com.t"), counting_handler(hits.clone())).await.unwrap();

        let options = PublishOptions {
            exclude_me: false,
            ..PublishOptions::default()
        };
        let event = SyncEvent::new("set", vec![], options);
        a.publish(&topic("com.t"), vec![], event.metadata()).await.unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscription_drop_cleanup() {
        let router = InMemoryRouter::new();
        let a = router.join();
        {
            let _s1 = a.subscribe(&topic("com.t"), counting_handler(Arc::default())).await.unwrap();
            let _s2 = a.subscribe(&topic("com.u"), counting_handler(Arc::default())).await.unwrap();
            assert_eq!(router.subscription_count(), 2);
        }
        assert_eq!(router.subscription_count(), 0);
    }

    #[tokio::test]
    async fn test_register_and_call() {
        let router = InMemoryRouter::new();
        let a = router.join();
        let b = router.join();

        let _reg = a
            .register(
                &topic("com.t.snapshot"),
                procedure_handler(|_args| async { Ok(json!("[1,2]")) }),
            )
            .await
            .unwrap();

        let result = b.call(&topic("com.t.snapshot"), vec![]).await.unwrap();
        assert_eq!(result, json!("[1,2]"));
    }

    #[tokio::test]
    async fn test_register_conflict() {
        let router = InMemoryRouter::new();
        let a = router.join();
        let b = router.join();
        let handler = procedure_handler(|_args| async { Ok(Value::Null) });

        let _reg = a.register(&topic("com.t.snapshot"), handler.clone()).await.unwrap();
        let err = b.register(&topic("com.t.snapshot"), handler).await.unwrap_err();
        assert!(matches!(err, BusError::ProcedureAlreadyRegistered { .. }));
    }

    #[tokio::test]
    async fn test_call_unknown_procedure() {
        let router = InMemoryRouter::new();
        let a = router.join();
        let err = a.call(&topic("com.none"), vec![]).await.unwrap_err();
        assert!(matches!(err, BusError::NoSuchProcedure { .. }));
    }

    #[tokio::test]
    async fn test_closed_session_reports_transport_lost() {
        let router = InMemoryRouter::new();
        let a = router.join();
        a.close();
        let err = a
            .publish(&topic("com.t"), vec![], EventMetadata::new())
            .await
            .unwrap_err();
        assert_eq!(err, BusError::TransportLost);
    }

    #[tokio::test]
    async fn test_leave_notifies_listeners_and_drops_entries() {
        let router = InMemoryRouter::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        router.add_disconnect_listener(Arc::new(move |peer: PeerId| sink.lock().push(peer)));

        let a = router.join();
        let peer = a.peer_id();
        let sub = a.subscribe(&topic("com.t"), counting_handler(Arc::default())).await.unwrap();
        assert_eq!(router.subscription_count(), 1);

        drop(a);

        assert_eq!(router.subscription_count(), 0);
        assert!(!router.is_connected(peer));
        assert_eq!(*seen.lock(), vec![peer]);
        drop(sub);
    }
}
