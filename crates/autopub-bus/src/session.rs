//! # Session
//!
//! The collaborator contract consumed by synchronized containers.

use crate::error::BusError;
use crate::handles::{Registration, Subscription};
use async_trait::async_trait;
use autopub_types::{EventArgs, EventMetadata, PeerId, Topic};
use futures::future::BoxFuture;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

/// Handler invoked for every event delivered on a subscribed topic.
pub type EventHandler =
    Arc<dyn Fn(EventArgs, EventMetadata) -> BoxFuture<'static, Result<(), BusError>> + Send + Sync>;

/// Handler invoked when a registered procedure is called.
pub type ProcedureHandler =
    Arc<dyn Fn(EventArgs) -> BoxFuture<'static, Result<Value, BusError>> + Send + Sync>;

/// A connection to the message bus.
///
/// Every primitive may suspend until the router acknowledges it.
#[async_trait]
pub trait Session: Send + Sync {
    /// Identity of this session on the bus.
    fn peer_id(&self) -> PeerId;

    /// Publish an event to every subscriber of `topic`.
    ///
    /// Failures are per-session; callers fanning out to several sessions
    /// decide whether a failure matters.
    async fn publish(
        &self,
        topic: &Topic,
        args: EventArgs,
        metadata: EventMetadata,
    ) -> Result<(), BusError>;

    /// Receive events published on `topic`.
    async fn subscribe(&self, topic: &Topic, handler: EventHandler)
        -> Result<Subscription, BusError>;

    /// Answer calls made to `topic`.
    ///
    /// Fails with `ProcedureAlreadyRegistered` when the topic is taken.
    async fn register(
        &self,
        topic: &Topic,
        handler: ProcedureHandler,
    ) -> Result<Registration, BusError>;

    /// Call the procedure registered at `topic`.
    async fn call(&self, topic: &Topic, args: EventArgs) -> Result<Value, BusError>;
}

/// Box an async closure into an [`EventHandler`].
pub fn event_handler<F, Fut>(f: F) -> EventHandler
where
    F: Fn(EventArgs, EventMetadata) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BusError>> + Send + 'static,
{
    Arc::new(move |args, metadata| Box::pin(f(args, metadata)))
}

/// Box an async closure into a [`ProcedureHandler`].
pub fn procedure_handler<F, Fut>(f: F) -> ProcedureHandler
where
    F: Fn(EventArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, BusError>> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}
