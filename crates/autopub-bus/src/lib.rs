//! # AutoPub Bus - Publish/Subscribe Contract
//!
//! The message bus is external infrastructure. Synchronized containers only
//! ever see it through the [`Session`] trait and its four primitives:
//!
//! ```text
//!   publish(topic, args, metadata)            fire an event at a topic
//!   subscribe(topic, handler) -> Subscription receive events on a topic
//!   register(topic, handler)  -> Registration answer calls on a topic
//!   call(topic, args)         -> Value        invoke a remote procedure
//! ```
//!
//! ## Routing
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Session A   │                    │  Session B   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │    Router    │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! [`InMemoryRouter`] is a loopback broker for single-process use and tests;
//! [`RecordingSession`] is a scripted double that records every call.
//!
//! ## Handles
//!
//! `Subscription` and `Registration` release their router entry when dropped.

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod error;
pub mod handles;
pub mod recording;
pub mod router;
pub mod session;

pub use error::BusError;
pub use handles::{Registration, Subscription};
pub use recording::{PublishedEvent, RecordingSession};
pub use router::{DisconnectListener, InMemoryRouter, LocalSession};
pub use session::{event_handler, procedure_handler, EventHandler, ProcedureHandler, Session};
