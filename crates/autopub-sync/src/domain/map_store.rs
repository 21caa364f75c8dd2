//! Ordered mapping store
//!
//! String keys, JSON values, insertion order preserved. Overwriting a key
//! keeps its position; deleting shifts later keys down.

use crate::domain::operation::{expect_args, string_arg, Operation, APPLY_SNAPSHOT};
use crate::domain::snapshot::{encode, Replicated, Snapshot};
use crate::error::SyncError;
use autopub_types::EventArgs;
use indexmap::IndexMap;
use serde_json::Value;

/// Mutators of a [`MapStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum MapOperation {
    /// Insert or overwrite a key.
    Set { key: String, value: Value },
    /// Remove a key.
    Delete { key: String },
    /// Replace every entry from snapshot text.
    ApplySnapshot { snapshot: String },
}

impl MapOperation {
    pub const SET: &'static str = "set";
    pub const DELETE: &'static str = "delete";
}

impl Operation for MapOperation {
    const NAMES: &'static [&'static str] = &[Self::SET, Self::DELETE, APPLY_SNAPSHOT];

    fn name(&self) -> &'static str {
        match self {
            Self::Set { .. } => Self::SET,
            Self::Delete { .. } => Self::DELETE,
            Self::ApplySnapshot { .. } => APPLY_SNAPSHOT,
        }
    }

    fn arguments(&self) -> EventArgs {
        match self {
            Self::Set { key, value } => vec![Value::String(key.clone()), value.clone()],
            Self::Delete { key } => vec![Value::String(key.clone())],
            Self::ApplySnapshot { snapshot } => vec![Value::String(snapshot.clone())],
        }
    }

    fn decode(name: &str, args: EventArgs) -> Result<Self, SyncError> {
        match name {
            Self::SET => {
                let [key, value] = expect_args::<2>(name, args)?;
                Ok(Self::Set {
                    key: string_arg(name, key)?,
                    value,
                })
            }
            Self::DELETE => {
                let [key] = expect_args::<1>(name, args)?;
                Ok(Self::Delete {
                    key: string_arg(name, key)?,
                })
            }
            APPLY_SNAPSHOT => {
                let [snapshot] = expect_args::<1>(name, args)?;
                Ok(Self::ApplySnapshot {
                    snapshot: string_arg(name, snapshot)?,
                })
            }
            other => Err(SyncError::UnknownOperation {
                name: other.to_string(),
            }),
        }
    }

    fn apply_snapshot(snapshot: String) -> Self {
        Self::ApplySnapshot { snapshot }
    }
}

/// Insertion-ordered map of JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStore {
    entries: IndexMap<String, Value>,
}

impl MapStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries, keeping their order.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Insert or overwrite; returns the previous value.
    pub fn set(&mut self, key: String, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    /// Remove a key; fails if it is absent.
    pub fn delete(&mut self, key: &str) -> Result<Value, SyncError> {
        self.entries
            .shift_remove(key)
            .ok_or_else(|| SyncError::KeyNotFound {
                key: key.to_string(),
            })
    }
}

impl Snapshot for MapStore {
    fn to_snapshot(&self) -> Result<String, SyncError> {
        encode(&self.entries)
    }

    fn apply_string(&mut self, snapshot: &str) -> Result<(), SyncError> {
        let entries: IndexMap<String, Value> = serde_json::from_str(snapshot)
            .map_err(|e| SyncError::MalformedSnapshot(e.to_string()))?;
        self.entries = entries;
        Ok(())
    }
}

impl Replicated for MapStore {
    type Op = MapOperation;

    fn apply(&mut self, op: &MapOperation) -> Result<Option<Value>, SyncError> {
        match op {
            MapOperation::Set { key, value } => Ok(self.set(key.clone(), value.clone())),
            MapOperation::Delete { key } => self.delete(key).map(Some),
            MapOperation::ApplySnapshot { snapshot } => {
                self.apply_string(snapshot)?;
                Ok(None)
            }
        }
    }
}
