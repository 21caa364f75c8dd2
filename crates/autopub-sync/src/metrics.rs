//! Counters for synchronized containers
//!
//! ## Usage
//!
//! ```ignore
//! let snapshot = map.metrics();
//! println!("{} published, {} failed", snapshot.events_published, snapshot.publish_failures);
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Per-container counters.
#[derive(Debug, Default)]
pub struct SyncMetrics {
    /// Local mutations that succeeded (including replays)
    mutations_applied: AtomicU64,
    /// Events handed to a subscriber without error
    events_published: AtomicU64,
    /// Per-subscriber publish failures
    publish_failures: AtomicU64,
    /// Remote operations replayed locally
    events_replayed: AtomicU64,
    /// Snapshot procedure calls answered
    snapshots_served: AtomicU64,
}

impl SyncMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_mutation(&self) {
        self.mutations_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_publish_failure(&self) {
        self.publish_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_replay(&self) {
        self.events_replayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_snapshot_served(&self) {
        self.snapshots_served.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current values.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            mutations_applied: self.mutations_applied.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            events_replayed: self.events_replayed.load(Ordering::Relaxed),
            snapshots_served: self.snapshots_served.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`SyncMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub mutations_applied: u64,
    pub events_published: u64,
    pub publish_failures: u64,
    pub events_replayed: u64,
    pub snapshots_served: u64,
}
