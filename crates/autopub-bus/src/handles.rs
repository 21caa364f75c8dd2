//! # Subscription and Registration Handles
//!
//! Returned by `subscribe` and `register`. Dropping a handle releases the
//! router entry it stands for.

use autopub_types::Topic;
use std::fmt;

type Release = Box<dyn FnOnce() + Send>;

/// Handle to an active topic subscription.
pub struct Subscription {
    id: u64,
    topic: Topic,
    release: Option<Release>,
}

impl Subscription {
    /// Create a handle that runs `release` when dropped.
    pub fn new(id: u64, topic: Topic, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            topic,
            release: Some(Box::new(release)),
        }
    }

    /// Create a handle with nothing to release.
    #[must_use]
    pub fn detached(id: u64, topic: Topic) -> Self {
        Self {
            id,
            topic,
            release: None,
        }
    }

    /// Router-assigned id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The subscribed topic.
    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}

/// Handle to a registered procedure.
pub struct Registration {
    id: u64,
    topic: Topic,
    release: Option<Release>,
}

impl Registration {
    /// Create a handle that runs `release` when dropped.
    pub fn new(id: u64, topic: Topic, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            id,
            topic,
            release: Some(Box::new(release)),
        }
    }

    /// Create a handle with nothing to release.
    #[must_use]
    pub fn detached(id: u64, topic: Topic) -> Self {
        Self {
            id,
            topic,
            release: None,
        }
    }

    /// Router-assigned id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The procedure topic.
    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}
