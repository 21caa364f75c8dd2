//! # AutoPub Node Library
//!
//! Runtime pieces of the `autopub-node` binary, exposed for testing.
//!
//! ## Demo Run
//!
//! ```text
//! 1. Join two sessions to an in-memory router
//! 2. Seed a map and a sequence, join them as authority
//! 3. Join mirrors of both as replicas (snapshot bootstrap)
//! 4. Mutate on both sides and check the copies converge
//! 5. Close the replica session; the disconnect hook drops it
//! ```

use autopub_bus::{InMemoryRouter, Session};
use autopub_sync::{MetricsSnapshot, SortOrder, SyncConfig, SyncError, SyncMap, SyncSequence};
use autopub_types::PeerId;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

/// Environment variable setting how many entries the authority is seeded with.
pub const ENV_DEMO_ENTRIES: &str = "AUTOPUB_DEMO_ENTRIES";

/// Object name used when none is configured.
pub const DEFAULT_NAME: &str = "demo";

/// Runtime configuration of the node binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Settings shared by the demo containers.
    pub sync: SyncConfig,
    /// Entries the authority map starts with.
    pub demo_entries: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            sync: SyncConfig::named(DEFAULT_NAME),
            demo_entries: 3,
        }
    }
}

impl NodeConfig {
    /// Load from `AUTOPUB_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            sync: SyncConfig::from_lookup(&lookup),
            ..Self::default()
        };
        if config.sync.name.is_empty() {
            config.sync.name = DEFAULT_NAME.to_string();
        }
        if let Some(entries) = lookup(ENV_DEMO_ENTRIES) {
            match entries.parse() {
                Ok(n) => config.demo_entries = n,
                Err(_) => warn!(
                    key = ENV_DEMO_ENTRIES,
                    value = %entries,
                    "Ignoring non-numeric entry count"
                ),
            }
        }
        config
    }
}

/// Outcome of [`run_demo`].
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub map_topic: String,
    pub sequence_topic: String,
    pub map_snapshot: String,
    pub sequence_snapshot: String,
    /// Whether every replica ended with the authority's state.
    pub converged: bool,
    /// Subscribers the replicas still held after their session closed.
    pub subscribers_after_disconnect: usize,
    pub authority_metrics: MetricsSnapshot,
    pub replica_metrics: MetricsSnapshot,
}

/// Run an authority and a replica of a map and a sequence over one router.
pub async fn run_demo(config: &NodeConfig) -> Result<DemoReport, SyncError> {
    let router = InMemoryRouter::new();
    let authority_session: Arc<dyn Session> = router.join();
    let replica_link = router.join();
    let replica_session: Arc<dyn Session> = replica_link.clone();

    // Authority side, seeded before anyone is listening
    let scores = SyncMap::with_entries(
        (0..config.demo_entries).map(|i| (format!("entry-{i}"), serde_json::json!(i))),
        config.sync.clone(),
    )?;
    let queue = SyncSequence::new(config.sync.clone())?;
    queue.set_topic(scores.topic().join("queue")?)?;
    for task in ["compact", "announce", "backup"] {
        queue.push(task).await?;
    }
    scores.join_as_authority(&authority_session).await?;
    queue.join_as_authority(&authority_session).await?;

    // Replica side
    let mirror = SyncMap::new(config.sync.clone())?;
    let queue_mirror = SyncSequence::new(config.sync.clone())?;
    queue_mirror.set_topic(queue.topic())?;
    mirror.join_as_replica(&replica_session).await?;
    queue_mirror.join_as_replica(&replica_session).await?;
    info!(
        map_entries = mirror.len(),
        queue_items = queue_mirror.len(),
        "Replicas bootstrapped"
    );

    {
        let mirror = mirror.clone();
        let queue_mirror = queue_mirror.clone();
        router.add_disconnect_listener(Arc::new(move |peer: PeerId| {
            mirror.peer_disconnected(&peer);
            queue_mirror.peer_disconnected(&peer);
        }));
    }

    // Changes flow both ways
    scores.set("leader", "authority").await?;
    mirror.set("follower", "replica").await?;
    if let Some(first) = scores.keys().into_iter().next() {
        mirror.delete(&first).await?;
    }
    queue_mirror.insert_at(0, "rotate-keys").await?;
    queue.sort(SortOrder::Ascending).await?;

    let map_snapshot = scores.to_snapshot()?;
    let sequence_snapshot = queue.to_snapshot()?;
    let converged =
        map_snapshot == mirror.to_snapshot()? && sequence_snapshot == queue_mirror.to_snapshot()?;
    if converged {
        info!(topic = %scores.topic(), "Replicas converged");
    } else {
        warn!(topic = %scores.topic(), "Replicas diverged");
    }

    drop(replica_session);
    replica_link.close();
    let subscribers_after_disconnect =
        mirror.subscribers().len() + queue_mirror.subscribers().len();

    Ok(DemoReport {
        map_topic: scores.topic().to_string(),
        sequence_topic: queue.topic().to_string(),
        map_snapshot,
        sequence_snapshot,
        converged,
        subscribers_after_disconnect,
        authority_metrics: scores.metrics(),
        replica_metrics: mirror.metrics(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults_name() {
        let config = NodeConfig::from_lookup(|_| None);
        assert_eq!(config.sync.name, DEFAULT_NAME);
        assert_eq!(config.demo_entries, 3);
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("AUTOPUB_NAME", "scores"),
            (ENV_DEMO_ENTRIES, "10"),
        ]
        .into_iter()
        .collect();
        let config = NodeConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.sync.name, "scores");
        assert_eq!(config.demo_entries, 10);
    }

    #[tokio::test]
    async fn test_demo_converges() {
        let report = run_demo(&NodeConfig::default()).await.unwrap();

        assert!(report.converged);
        assert_eq!(report.map_topic, "com.demo");
        assert_eq!(report.sequence_topic, "com.demo.queue");
        assert_eq!(
            report.map_snapshot,
            r#"{"entry-1":1,"entry-2":2,"leader":"authority","follower":"replica"}"#
        );
        assert_eq!(
            report.sequence_snapshot,
            r#"["announce","backup","compact","rotate-keys"]"#
        );
        assert_eq!(report.subscribers_after_disconnect, 0);
        assert!(report.replica_metrics.events_replayed >= 1);
    }
}
