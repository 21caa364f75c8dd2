//! # AutoPub Node
//!
//! Entry point of the synchronized-container runtime.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`RUST_LOG`, default `info`)
//! 2. Load configuration from `AUTOPUB_*` environment variables
//! 3. Validate it
//! 4. Run an authority and a replica over the in-memory router
//! 5. Report the outcome

use anyhow::{bail, Context, Result};
use autopub_node::{run_demo, NodeConfig};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Load configuration
    let config = NodeConfig::from_env();
    config.sync.validate().context("Invalid sync configuration")?;

    info!("===========================================");
    info!("  AutoPub Node v{}", env!("CARGO_PKG_VERSION"));
    info!("  Topic: {}", config.sync.topic()?);
    info!("===========================================");

    let report = run_demo(&config).await.context("Demo run failed")?;

    info!(
        map = %report.map_snapshot,
        sequence = %report.sequence_snapshot,
        published = report.authority_metrics.events_published,
        replayed = report.replica_metrics.events_replayed,
        "Demo finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.converged {
        bail!("Replicas did not converge on {}", report.map_topic);
    }
    Ok(())
}
