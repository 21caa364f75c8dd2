//! Synchronized sequence

use crate::config::SyncConfig;
use crate::domain::snapshot::to_value;
use crate::domain::{PublishSpec, SequenceOperation, SequenceStore, Snapshot, SortOrder};
use crate::error::SyncError;
use crate::service::Replica;
use serde::Serialize;
use serde_json::Value;
use std::ops::Deref;

/// A zero-indexed list whose mutations are published.
///
/// `set_at` and `delete_at` fail with `IndexOutOfRange` before anything is
/// published; `insert_at` past the end appends.
#[derive(Debug, Clone)]
pub struct SyncSequence {
    replica: Replica<SequenceStore>,
}

impl SyncSequence {
    /// An empty, detached sequence.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        Self::with_store(SequenceStore::new(), config)
    }

    /// A detached sequence seeded with `items`.
    pub fn with_items(items: Vec<Value>, config: SyncConfig) -> Result<Self, SyncError> {
        Self::with_store(SequenceStore::from_items(items), config)
    }

    /// A detached sequence seeded from snapshot text.
    pub fn from_snapshot(snapshot: &str, config: SyncConfig) -> Result<Self, SyncError> {
        let mut store = SequenceStore::new();
        store.apply_string(snapshot)?;
        Self::with_store(store, config)
    }

    fn with_store(store: SequenceStore, config: SyncConfig) -> Result<Self, SyncError> {
        Ok(Self {
            replica: Replica::new(store, config)?,
        })
    }

    /// See [`Replica::with_publish_spec`].
    pub fn with_publish_spec(self, operation: &str, spec: PublishSpec) -> Result<Self, SyncError> {
        Ok(Self {
            replica: self.replica.with_publish_spec(operation, spec)?,
        })
    }

    /// Overwrite the item at `index`. Returns the previous item.
    pub async fn set_at<V: Serialize + ?Sized>(
        &self,
        index: usize,
        value: &V,
    ) -> Result<Value, SyncError> {
        let value = to_value(value)?;
        let previous = self
            .replica
            .execute(SequenceOperation::SetAt { index, value })
            .await?;
        Ok(previous.unwrap_or(Value::Null))
    }

    /// Remove the item at `index`. Returns it.
    pub async fn delete_at(&self, index: usize) -> Result<Value, SyncError> {
        let removed = self
            .replica
            .execute(SequenceOperation::DeleteAt { index })
            .await?;
        Ok(removed.unwrap_or(Value::Null))
    }

    /// Insert before `index`; appends when `index` is past the end.
    pub async fn insert_at<V: Serialize + ?Sized>(
        &self,
        index: usize,
        value: &V,
    ) -> Result<(), SyncError> {
        let value = to_value(value)?;
        self.replica
            .execute(SequenceOperation::InsertAt { index, value })
            .await
            .map(|_| ())
    }

    /// Append. Published as `insert_at` with the current length.
    pub async fn push<V: Serialize + ?Sized>(&self, value: &V) -> Result<(), SyncError> {
        let index = self.len();
        self.insert_at(index, value).await
    }

    /// Stable sort of every item.
    pub async fn sort(&self, order: SortOrder) -> Result<(), SyncError> {
        self.replica
            .execute(SequenceOperation::Sort { order })
            .await
            .map(|_| ())
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.replica.read(|store| store.get(index).cloned())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.replica.read(SequenceStore::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replica.read(SequenceStore::is_empty)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<Value> {
        self.replica.read(|store| store.as_slice().to_vec())
    }
}

impl Deref for SyncSequence {
    type Target = Replica<SequenceStore>;

    fn deref(&self) -> &Self::Target {
        &self.replica
    }
}
