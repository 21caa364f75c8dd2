//! # Topics
//!
//! Hierarchical bus addresses such as `com.example.scores`.
//!
//! Components are joined with `.`; none may be empty or contain whitespace
//! or `#`.

use crate::errors::TopicError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between topic components.
pub const SEPARATOR: char = '.';

/// A validated bus address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Validate and wrap a topic string.
    pub fn new(topic: impl Into<String>) -> Result<Self, TopicError> {
        let topic = topic.into();
        validate(&topic)?;
        Ok(Self(topic))
    }

    /// Build a topic from a base URI and an object name.
    ///
    /// Either part may be empty; when both are present they are joined with
    /// the separator. Both empty is an error.
    pub fn from_parts(base_uri: &str, name: &str) -> Result<Self, TopicError> {
        match (base_uri.is_empty(), name.is_empty()) {
            (true, true) => Err(TopicError::Empty),
            (false, true) => Self::new(base_uri),
            (true, false) => Self::new(name),
            (false, false) => Self::new(format!("{base_uri}{SEPARATOR}{name}")),
        }
    }

    /// Append a sub-topic, e.g. `com.scores` + `snapshot`.
    pub fn join(&self, suffix: &str) -> Result<Self, TopicError> {
        Self::new(format!("{}{SEPARATOR}{suffix}", self.0))
    }

    /// The topic as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Check a single suffix (one or more components) without building a topic.
pub fn validate_suffix(suffix: &str) -> Result<(), TopicError> {
    validate(suffix)
}

fn validate(topic: &str) -> Result<(), TopicError> {
    if topic.is_empty() {
        return Err(TopicError::Empty);
    }
    for component in topic.split(SEPARATOR) {
        if component.is_empty() {
            return Err(TopicError::EmptyComponent {
                topic: topic.to_string(),
            });
        }
        if let Some(character) = component
            .chars()
            .find(|c| c.is_whitespace() || *c == '#')
        {
            return Err(TopicError::InvalidCharacter {
                topic: topic.to_string(),
                character,
            });
        }
    }
    Ok(())
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Topic {
    type Error = TopicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}
