//! # Recording Session
//!
//! A scripted [`Session`] double that records every primitive invoked on it.
//!
//! - publishes are appended to a log (or fail with a configured error)
//! - subscription handlers are kept so a test can [`deliver`] events to them
//! - registered procedures are kept so a test can [`invoke`] them as a remote
//!   peer would
//! - `call` answers from scripted responses, then from its own registrations
//!
//! [`deliver`]: RecordingSession::deliver
//! [`invoke`]: RecordingSession::invoke

use crate::error::BusError;
use crate::handles::{Registration, Subscription};
use crate::session::{EventHandler, ProcedureHandler, Session};
use async_trait::async_trait;
use autopub_types::{EventArgs, EventMetadata, PeerId, Topic};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// One recorded publish.
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedEvent {
    /// Topic the event was published on.
    pub topic: Topic,
    /// Positional arguments.
    pub args: EventArgs,
    /// Keyword metadata.
    pub metadata: EventMetadata,
}

#[derive(Default)]
struct Script {
    publish_error: Option<BusError>,
    subscribe_error: Option<BusError>,
    register_error: Option<BusError>,
    call_responses: HashMap<Topic, Result<Value, BusError>>,
}

/// A session that records instead of routing.
pub struct RecordingSession {
    peer: PeerId,
    next_id: AtomicU64,
    published: Mutex<Vec<PublishedEvent>>,
    subscriptions: Mutex<Vec<(Topic, EventHandler)>>,
    procedures: Mutex<HashMap<Topic, ProcedureHandler>>,
    calls: Mutex<Vec<Topic>>,
    script: Mutex<Script>,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSession {
    /// Create a session with a random peer id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            peer: PeerId::random(),
            next_id: AtomicU64::new(0),
            published: Mutex::new(Vec::new()),
            subscriptions: Mutex::new(Vec::new()),
            procedures: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            script: Mutex::new(Script::default()),
        }
    }

    /// Make every subsequent publish fail with `error`.
    pub fn fail_publishes_with(&self, error: BusError) {
        self.script.lock().publish_error = Some(error);
    }

    /// Make every subsequent subscribe fail with `error`.
    pub fn fail_subscribes_with(&self, error: BusError) {
        self.script.lock().subscribe_error = Some(error);
    }

    /// Make every subsequent register fail with `error`.
    pub fn fail_registers_with(&self, error: BusError) {
        self.script.lock().register_error = Some(error);
    }

    /// Script the result of calling `topic`.
    pub fn respond_to_call(&self, topic: Topic, response: Result<Value, BusError>) {
        self.script.lock().call_responses.insert(topic, response);
    }

    /// Every publish recorded so far.
    #[must_use]
    pub fn published(&self) -> Vec<PublishedEvent> {
        self.published.lock().clone()
    }

    /// Number of publishes recorded so far.
    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.published.lock().len()
    }

    /// Topics with at least one live handler, in subscription order.
    #[must_use]
    pub fn subscribed_topics(&self) -> Vec<Topic> {
        self.subscriptions
            .lock()
            .iter()
            .map(|(topic, _)| topic.clone())
            .collect()
    }

    /// Topics with a registered procedure.
    #[must_use]
    pub fn registered_topics(&self) -> Vec<Topic> {
        let mut topics: Vec<Topic> = self.procedures.lock().keys().cloned().collect();
        topics.sort();
        topics
    }

    /// Topics called so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Topic> {
        self.calls.lock().clone()
    }

    /// Feed an event to every handler subscribed on `topic`.
    ///
    /// Returns the first handler error, after running every handler.
    pub async fn deliver(
        &self,
        topic: &Topic,
        args: EventArgs,
        metadata: EventMetadata,
    ) -> Result<usize, BusError> {
        let handlers: Vec<EventHandler> = self
            .subscriptions
            .lock()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, handler)| handler.clone())
            .collect();
        let mut first_error = None;
        for handler in &handlers {
            if let Err(e) = handler(args.clone(), metadata.clone()).await {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(handlers.len()),
        }
    }

    /// Call a procedure registered on this session, as a remote peer would.
    pub async fn invoke(&self, topic: &Topic, args: EventArgs) -> Result<Value, BusError> {
        let handler = self
            .procedures
            .lock()
            .get(topic)
            .cloned()
            .ok_or_else(|| BusError::NoSuchProcedure {
                topic: topic.to_string(),
            })?;
        handler(args).await
    }
}

#[async_trait]
impl Session for RecordingSession {
    fn peer_id(&self) -> PeerId {
        self.peer
    }

    async fn publish(
        &self,
        topic: &Topic,
        args: EventArgs,
        metadata: EventMetadata,
    ) -> Result<(), BusError> {
        if let Some(error) = self.script.lock().publish_error.clone() {
            return Err(error);
        }
        self.published.lock().push(PublishedEvent {
            topic: topic.clone(),
            args,
            metadata,
        });
        Ok(())
    }

    async fn subscribe(
        &self,
        topic: &Topic,
        handler: EventHandler,
    ) -> Result<Subscription, BusError> {
        if let Some(error) = self.script.lock().subscribe_error.clone() {
            return Err(error);
        }
        self.subscriptions.lock().push((topic.clone(), handler));
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Subscription::detached(id, topic.clone()))
    }

    async fn register(
        &self,
        topic: &Topic,
        handler: ProcedureHandler,
    ) -> Result<Registration, BusError> {
        if let Some(error) = self.script.lock().register_error.clone() {
            return Err(error);
        }
        let mut procedures = self.procedures.lock();
        if procedures.contains_key(topic) {
            return Err(BusError::ProcedureAlreadyRegistered {
                topic: topic.to_string(),
            });
        }
        procedures.insert(topic.clone(), handler);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(Registration::detached(id, topic.clone()))
    }

    async fn call(&self, topic: &Topic, args: EventArgs) -> Result<Value, BusError> {
        self.calls.lock().push(topic.clone());
        let scripted = self.script.lock().call_responses.get(topic).cloned();
        match scripted {
            Some(response) => response,
            None => self.invoke(topic, args).await,
        }
    }
}
