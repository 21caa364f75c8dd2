//! Subscriber registry
//!
//! The set of sessions that receive a container's publishes. Entries are
//! keyed by peer id and hold only a `Weak` to the session, so membership
//! never keeps a session alive. Dead entries disappear the next time the set
//! is read; the bus can also remove a peer explicitly when it disconnects.

use autopub_bus::Session;
use autopub_types::PeerId;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// Weakly-held set of subscribed sessions.
#[derive(Default)]
pub struct SubscriberRegistry {
    peers: HashMap<PeerId, Weak<dyn Session>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session. Returns `false` if it was already present.
    pub fn add(&mut self, session: &Arc<dyn Session>) -> bool {
        self.peers
            .insert(session.peer_id(), Arc::downgrade(session))
            .map_or(true, |previous| previous.strong_count() == 0)
    }

    /// Remove a peer. Returns `false` if it was not present.
    pub fn remove(&mut self, peer: &PeerId) -> bool {
        self.peers.remove(peer).is_some()
    }

    /// Whether the peer is present and still alive.
    #[must_use]
    pub fn contains(&self, peer: &PeerId) -> bool {
        self.peers
            .get(peer)
            .is_some_and(|session| session.strong_count() > 0)
    }

    /// Upgrade every live session, pruning dead ones.
    ///
    /// The returned list is a copy: callers iterate it without holding the
    /// registry, so a peer callback may change membership mid fan-out.
    pub fn snapshot(&mut self) -> Vec<Arc<dyn Session>> {
        self.prune();
        let mut live: Vec<Arc<dyn Session>> =
            self.peers.values().filter_map(Weak::upgrade).collect();
        live.sort_by_key(|session| session.peer_id());
        live
    }

    /// Ids of live peers.
    #[must_use]
    pub fn peers(&self) -> Vec<PeerId> {
        let mut peers: Vec<PeerId> = self
            .peers
            .iter()
            .filter(|(_, session)| session.strong_count() > 0)
            .map(|(peer, _)| *peer)
            .collect();
        peers.sort();
        peers
    }

    /// Number of live peers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers
            .values()
            .filter(|session| session.strong_count() > 0)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop entries whose session is gone. Returns how many were removed.
    pub fn prune(&mut self) -> usize {
        let before = self.peers.len();
        self.peers.retain(|_, session| session.strong_count() > 0);
        before - self.peers.len()
    }
}
