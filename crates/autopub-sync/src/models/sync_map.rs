//! Synchronized mapping

use crate::config::SyncConfig;
use crate::domain::snapshot::to_value;
use crate::domain::{MapOperation, MapStore, PublishSpec, Snapshot};
use crate::error::SyncError;
use crate::service::Replica;
use serde::Serialize;
use serde_json::Value;
use std::ops::Deref;

/// An insertion-ordered string-keyed map whose mutations are published.
///
/// Reads go straight to the local store. `set` and `delete` run through the
/// publish wrapper; everything bus-related (`join_as_*`, `subscribe`,
/// `block_propagation`, ...) comes from [`Replica`] via `Deref`.
///
/// ```ignore
/// let scores = SyncMap::new(SyncConfig::named("scores"))?;
/// scores.join_as_authority(&session).await?;
/// scores.set("alice", &3).await?;
/// assert_eq!(scores.get("alice"), Some(json!(3)));
/// ```
#[derive(Debug, Clone)]
pub struct SyncMap {
    replica: Replica<MapStore>,
}

impl SyncMap {
    /// An empty, detached map.
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        Self::with_store(MapStore::new(), config)
    }

    /// A detached map seeded with `entries`, in iteration order.
    pub fn with_entries(
        entries: impl IntoIterator<Item = (String, Value)>,
        config: SyncConfig,
    ) -> Result<Self, SyncError> {
        Self::with_store(MapStore::from_entries(entries), config)
    }

    /// A detached map seeded from snapshot text.
    pub fn from_snapshot(snapshot: &str, config: SyncConfig) -> Result<Self, SyncError> {
        let mut store = MapStore::new();
        store.apply_string(snapshot)?;
        Self::with_store(store, config)
    }

    fn with_store(store: MapStore, config: SyncConfig) -> Result<Self, SyncError> {
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

    /// Insert or overwrite `key`. Returns the previous value.
    ///
    /// `value` is converted before anything changes, so a value that cannot
    /// be represented fails with `NotSerializable` and leaves the map as is.
    pub async fn set<V: Serialize + ?Sized>(
        &self,
        key: impl Into<String>,
        value: &V,
    ) -> Result<Option<Value>, SyncError> {
        let value = to_value(value)?;
        self.replica
            .execute(MapOperation::Set {
                key: key.into(),
                value,
            })
            .await
    }

    /// Remove `key`. Fails with `KeyNotFound` when absent.
    pub async fn delete(&self, key: &str) -> Result<Value, SyncError> {
        let removed = self
            .replica
            .execute(MapOperation::Delete {
                key: key.to_string(),
            })
            .await?;
        removed.ok_or_else(|| SyncError::KeyNotFound {
            key: key.to_string(),
        })
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.replica.read(|store| store.get(key).cloned())
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.replica.read(|store| store.contains_key(key))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.replica.read(MapStore::len)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.replica.read(MapStore::is_empty)
    }

    /// Keys in insertion order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.replica.read(|store| store.keys().cloned().collect())
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.replica.read(|store| {
            store
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        })
    }
}

impl Deref for SyncMap {
    type Target = Replica<MapStore>;

    fn deref(&self) -> &Self::Target {
        &self.replica
    }
}
