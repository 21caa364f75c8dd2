//! Mutating operations and their publish settings
//!
//! Each container variant owns a closed enum of mutators. Replaying a remote
//! event means looking its name up in that enum's table, so an unknown name
//! fails with `UnknownOperation` instead of reaching arbitrary code.

use crate::error::SyncError;
use autopub_types::topic::validate_suffix;
use autopub_types::{EventArgs, PublishOptions, Topic};
use serde_json::Value;
use std::fmt;

/// Wire name of the full-state replacement every variant supports.
pub const APPLY_SNAPSHOT: &str = "apply_snapshot";

/// The closed set of mutators of one container variant.
pub trait Operation: fmt::Debug + Send + Sync + Sized + 'static {
    /// Wire names of every mutator in the set.
    const NAMES: &'static [&'static str];

    /// Wire name of this operation.
    fn name(&self) -> &'static str;

    /// Positional arguments as published.
    fn arguments(&self) -> EventArgs;

    /// Rebuild an operation from a wire name and its arguments.
    ///
    /// Fails with `UnknownOperation` for names outside [`Self::NAMES`] and
    /// `InvalidArguments` when the arguments do not fit.
    fn decode(name: &str, args: EventArgs) -> Result<Self, SyncError>;

    /// The operation replacing the whole state with `snapshot`.
    fn apply_snapshot(snapshot: String) -> Self;

    /// Whether `name` is one of this variant's mutators.
    fn is_mutator(name: &str) -> bool {
        Self::NAMES.contains(&name)
    }
}

/// How one operation is published: optional sub-topic plus dispatch options.
///
/// The sub-topic is validated when the spec is built, not when it is used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishSpec {
    sub_topic: Option<String>,
    options: PublishOptions,
}

impl PublishSpec {
    /// Publish on the container topic with `options`.
    #[must_use]
    pub fn new(options: PublishOptions) -> Self {
        Self {
            sub_topic: None,
            options,
        }
    }

    /// Publish on `<topic>.<sub_topic>` instead.
    pub fn with_sub_topic(mut self, sub_topic: impl Into<String>) -> Result<Self, SyncError> {
        let sub_topic = sub_topic.into();
        validate_suffix(&sub_topic)?;
        self.sub_topic = Some(sub_topic);
        Ok(self)
    }

    #[must_use]
    pub fn sub_topic(&self) -> Option<&str> {
        self.sub_topic.as_deref()
    }

    #[must_use]
    pub fn options(&self) -> &PublishOptions {
        &self.options
    }

    /// The topic events are published on.
    pub fn resolve(&self, topic: &Topic) -> Result<Topic, SyncError> {
        match &self.sub_topic {
            None => Ok(topic.clone()),
            Some(sub_topic) => Ok(topic.join(sub_topic)?),
        }
    }
}

/// Split `args` into exactly `N` positional values.
pub(crate) fn expect_args<const N: usize>(
    operation: &str,
    args: EventArgs,
) -> Result<[Value; N], SyncError> {
    let len = args.len();
    <[Value; N]>::try_from(args).map_err(|_| {
        SyncError::invalid_arguments(operation, format!("expected {N} arguments, got {len}"))
    })
}

pub(crate) fn string_arg(operation: &str, value: Value) -> Result<String, SyncError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(SyncError::invalid_arguments(
            operation,
            format!("expected a string, got {other}"),
        )),
    }
}

pub(crate) fn index_arg(operation: &str, value: &Value) -> Result<usize, SyncError> {
    value
        .as_u64()
        .and_then(|index| usize::try_from(index).ok())
        .ok_or_else(|| {
            SyncError::invalid_arguments(
                operation,
                format!("expected a non-negative index, got {value}"),
            )
        })
}
