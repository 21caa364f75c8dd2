//! # AutoPub Types
//!
//! Vocabulary shared by every crate in the workspace.
//!
//! ## Contents
//!
//! - `PeerId`: identity of a bus session
//! - `Topic`: a validated, dot-separated bus address
//! - `PublishOptions`: per-publish dispatch options
//! - `SyncEvent`: the operation envelope carried in publish metadata
//!
//! ## Design Principles
//!
//! - **Validated at the edge**: a `Topic` can only be built through its
//!   constructors, so every address handed to the bus is well formed.
//! - **Metadata is a plain map**: inbound metadata is kept as a JSON object so
//!   receivers can report exactly which key was missing.

pub mod entities;
pub mod errors;
pub mod event;
pub mod topic;

pub use entities::{PeerId, PublishOptions};
pub use errors::TopicError;
pub use event::{EventArgs, EventMetadata, SyncEvent, OPERATION_KEY, OPTIONS_KEY};
pub use topic::Topic;
