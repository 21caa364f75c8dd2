//! Service layer: the synchronization protocol around a store.
//!
//! - `replica`: construction, topic binding, subscriber set, gate access
//! - `publisher`: wrapped mutations and fan-out
//! - `receiver`: replay of remote events, bus handlers
//! - `bootstrap`: `join_as_authority` / `join_as_replica`

pub mod bootstrap;
pub mod publisher;
pub mod receiver;
pub mod replica;

pub use bootstrap::JoinState;
pub use replica::Replica;
