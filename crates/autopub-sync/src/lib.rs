//! # AutoPub Sync - Synchronized Containers
//!
//! A mapping and a sequence whose every mutation is published to remote
//! replicas on the same topic, and whose initial state can be fetched from
//! an authority.
//!
//! ## Mutation Flow
//!
//! ```text
//! local call ──► wrapper ──► store.apply ──► gate open? ──► publish to each subscriber
//!                                               │
//!                                               └─ closed: stop here
//!
//! bus event ──► receiver ──► gate.suspend() ──► wrapper ──► store.apply (no publish)
//! ```
//!
//! Replaying with the gate closed is what keeps two replicas from echoing a
//! mutation back and forth forever.
//!
//! ## Bootstrap
//!
//! | Path | Steps |
//! |------|-------|
//! | `join_as_authority` | add session as subscriber, register `<topic>.<snapshot_method>`, subscribe |
//! | `join_as_replica` | subscribe, call `<topic>.<snapshot_method>`, load snapshot, add session as subscriber |
//!
//! ```text
//! [Detached] ──join──→ [Joining] ──ok──→ [Attached]
//!                          │
//!                          └── error / cancelled ──→ [Failed]
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! domain/   - stores, operations, gate, registry (no I/O)
//! service/  - Replica: publish wrapper, receiver, bootstrap
//! models/   - SyncMap, SyncSequence
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let router = InMemoryRouter::new();
//! let authority: Arc<dyn Session> = router.join();
//! let replica: Arc<dyn Session> = router.join();
//!
//! let scores = SyncMap::new(SyncConfig::named("scores"))?;
//! scores.join_as_authority(&authority).await?;
//! scores.set("alice", &3).await?;
//!
//! let mirror = SyncMap::new(SyncConfig::named("scores"))?;
//! mirror.join_as_replica(&replica).await?;
//! assert_eq!(mirror.get("alice"), Some(json!(3)));
//! ```

#![allow(clippy::missing_const_for_fn)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod models;
pub mod service;

// Re-exports for convenience
pub use config::{SyncConfig, SyncConfigBuilder};
pub use domain::{
    compare_values, MapOperation, MapStore, Operation, PropagationGate, PublishSpec, Replicated,
    SequenceOperation, SequenceStore, Snapshot, SortOrder, SubscriberRegistry, SuspendGuard,
    APPLY_SNAPSHOT,
};
pub use error::SyncError;
pub use metrics::{MetricsSnapshot, SyncMetrics};
pub use models::{SyncMap, SyncSequence};
pub use service::{JoinState, Replica};
