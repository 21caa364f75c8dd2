//! # Entities
//!
//! Peer identities and publish options.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a session attached to the bus.
///
/// Registries key peers by this id instead of holding the session itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(Uuid);

impl PeerId {
    /// Generate a fresh random peer id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// The underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dispatch options attached to a publish.
///
/// Mirrors the options a router honours when fanning an event out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishOptions {
    /// Ask the router to acknowledge the publish.
    pub acknowledge: bool,
    /// Do not deliver the event back to the publishing session.
    pub exclude_me: bool,
    /// Reveal the publisher's identity to receivers.
    pub disclose_me: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            acknowledge: false,
            exclude_me: true,
            disclose_me: false,
        }
    }
}

impl PublishOptions {
    /// Options requesting an acknowledgement.
    #[must_use]
    pub fn acknowledged() -> Self {
        Self {
            acknowledge: true,
            ..Self::default()
        }
    }
}
