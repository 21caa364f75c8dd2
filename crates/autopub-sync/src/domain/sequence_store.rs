//! Ordered sequence store
//!
//! Zero-indexed. `set_at` and `delete_at` are strict about bounds;
//! `insert_at` past the end appends.

use crate::domain::operation::{expect_args, index_arg, string_arg, Operation, APPLY_SNAPSHOT};
use crate::domain::ordering::SortOrder;
use crate::domain::snapshot::{encode, Replicated, Snapshot};
use crate::error::SyncError;
use autopub_types::EventArgs;
use serde_json::Value;

/// Mutators of a [`SequenceStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceOperation {
    /// Overwrite the item at an index.
    SetAt { index: usize, value: Value },
    /// Remove the item at an index.
    DeleteAt { index: usize },
    /// Insert before an index (append when past the end).
    InsertAt { index: usize, value: Value },
    /// Stable sort of every item.
    Sort { order: SortOrder },
    /// Replace every item from snapshot text.
    ApplySnapshot { snapshot: String },
}

impl SequenceOperation {
    pub const SET_AT: &'static str = "set_at";
    pub const DELETE_AT: &'static str = "delete_at";
    pub const INSERT_AT: &'static str = "insert_at";
    pub const SORT: &'static str = "sort";
}

impl Operation for SequenceOperation {
    const NAMES: &'static [&'static str] = &[
        Self::SET_AT,
        Self::DELETE_AT,
        Self::INSERT_AT,
        Self::SORT,
        APPLY_SNAPSHOT,
    ];

    fn name(&self) -> &'static str {
        match self {
            Self::SetAt { .. } => Self::SET_AT,
            Self::DeleteAt { .. } => Self::DELETE_AT,
            Self::InsertAt { .. } => Self::INSERT_AT,
            Self::Sort { .. } => Self::SORT,
            Self::ApplySnapshot { .. } => APPLY_SNAPSHOT,
        }
    }

    fn arguments(&self) -> EventArgs {
        match self {
            Self::SetAt { index, value } | Self::InsertAt { index, value } => {
                vec![Value::from(*index), value.clone()]
            }
            Self::DeleteAt { index } => vec![Value::from(*index)],
            Self::Sort { order } => vec![Value::String(
                match order {
                    SortOrder::Ascending => "ascending",
                    SortOrder::Descending => "descending",
                }
                .to_string(),
            )],
            Self::ApplySnapshot { snapshot } => vec![Value::String(snapshot.clone())],
        }
    }

    fn decode(name: &str, args: EventArgs) -> Result<Self, SyncError> {
        match name {
            Self::SET_AT => {
                let [index, value] = expect_args::<2>(name, args)?;
                Ok(Self::SetAt {
                    index: index_arg(name, &index)?,
                    value,
                })
            }
            Self::DELETE_AT => {
                let [index] = expect_args::<1>(name, args)?;
                Ok(Self::DeleteAt {
                    index: index_arg(name, &index)?,
                })
            }
            Self::INSERT_AT => {
                let [index, value] = expect_args::<2>(name, args)?;
                Ok(Self::InsertAt {
                    index: index_arg(name, &index)?,
                    value,
                })
            }
            Self::SORT => {
                let [order] = expect_args::<1>(name, args)?;
                let order = serde_json::from_value(order)
                    .map_err(|e| SyncError::invalid_arguments(name, e.to_string()))?;
                Ok(Self::Sort { order })
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

/// Ordered sequence of JSON values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceStore {
    items: Vec<Value>,
}

impl SequenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_items(items: Vec<Value>) -> Self {
        Self { items }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    fn check_index(&self, index: usize) -> Result<(), SyncError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(SyncError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }

    /// Overwrite an item; returns the previous one.
    pub fn set_at(&mut self, index: usize, value: Value) -> Result<Value, SyncError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    /// Remove an item; returns it.
    pub fn delete_at(&mut self, index: usize) -> Result<Value, SyncError> {
        self.check_index(index)?;
        Ok(self.items.remove(index))
    }

    /// Insert before `index`, appending when `index` is past the end.
    pub fn insert_at(&mut self, index: usize, value: Value) {
        let index = index.min(self.items.len());
        self.items.insert(index, value);
    }

    /// Stable sort in the given direction.
    pub fn sort(&mut self, order: SortOrder) {
        self.items.sort_by(|a, b| order.compare(a, b));
    }
}

impl Snapshot for SequenceStore {
    fn to_snapshot(&self) -> Result<String, SyncError> {
        encode(&self.items)
    }

    fn apply_string(&mut self, snapshot: &str) -> Result<(), SyncError> {
        let items: Vec<Value> = serde_json::from_str(snapshot)
            .map_err(|e| SyncError::MalformedSnapshot(e.to_string()))?;
        self.items = items;
        Ok(())
    }
}

impl Replicated for SequenceStore {
    type Op = SequenceOperation;

    fn apply(&mut self, op: &SequenceOperation) -> Result<Option<Value>, SyncError> {
        match op {
            SequenceOperation::SetAt { index, value } => {
                self.set_at(*index, value.clone()).map(Some)
            }
            SequenceOperation::DeleteAt { index } => self.delete_at(*index).map(Some),
            SequenceOperation::InsertAt { index, value } => {
                self.insert_at(*index, value.clone());
                Ok(None)
            }
            SequenceOperation::Sort { order } => {
                self.sort(*order);
                Ok(None)
            }
            SequenceOperation::ApplySnapshot { snapshot } => {
                self.apply_string(snapshot)?;
                Ok(None)
            }
        }
    }
}
