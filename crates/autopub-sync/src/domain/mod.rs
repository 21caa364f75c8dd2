//! Domain layer: pure state and rules, no bus I/O.

pub mod gate;
pub mod map_store;
pub mod operation;
pub mod ordering;
pub mod registry;
pub mod sequence_store;
pub mod snapshot;

pub use gate::{PropagationGate, SuspendGuard};
pub use map_store::{MapOperation, MapStore};
pub use operation::{Operation, PublishSpec, APPLY_SNAPSHOT};
pub use ordering::{compare_values, SortOrder};
pub use registry::SubscriberRegistry;
pub use sequence_store::{SequenceOperation, SequenceStore};
pub use snapshot::{Replicated, Snapshot};
