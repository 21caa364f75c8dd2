//! Container variants built on [`Replica`](crate::service::Replica).

pub mod sync_map;
pub mod sync_sequence;

pub use sync_map::SyncMap;
pub use sync_sequence::SyncSequence;
