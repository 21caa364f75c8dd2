//! # Error Types

use thiserror::Error;

/// Errors raised while building a topic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopicError {
    /// The topic has no components at all.
    #[error("Topic must not be empty")]
    Empty,

    /// A dot-separated component is empty (leading, trailing or doubled dot).
    #[error("Topic '{topic}' contains an empty component")]
    EmptyComponent { topic: String },

    /// A component contains whitespace or a reserved character.
    #[error("Topic '{topic}' contains invalid character {character:?}")]
    InvalidCharacter { topic: String, character: char },
}
