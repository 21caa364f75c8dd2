//! Container configuration
//!
//! # Example
//!
//! ```ignore
//! use autopub_sync::SyncConfigBuilder;
//!
//! let config = SyncConfigBuilder::new()
//!     .base_uri("com.example")
//!     .name("scores")
//!     .call_timeout(Duration::from_secs(2))
//!     .build()?;
//! assert_eq!(config.topic()?.as_str(), "com.example.scores");
//! ```

use crate::error::SyncError;
use autopub_types::topic::validate_suffix;
use autopub_types::{PublishOptions, Topic};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

/// Environment variable overriding the base URI.
pub const ENV_BASE_URI: &str = "AUTOPUB_BASE_URI";
/// Environment variable overriding the object name.
pub const ENV_NAME: &str = "AUTOPUB_NAME";
/// Environment variable overriding the snapshot procedure name.
pub const ENV_SNAPSHOT_METHOD: &str = "AUTOPUB_SNAPSHOT_METHOD";
/// Environment variable overriding the snapshot call timeout, in milliseconds.
pub const ENV_CALL_TIMEOUT_MS: &str = "AUTOPUB_CALL_TIMEOUT_MS";
/// Environment variable enabling a full-state broadcast after joining as authority.
pub const ENV_BROADCAST_ON_JOIN: &str = "AUTOPUB_BROADCAST_ON_JOIN";

/// Settings of one synchronized container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base of the container topic.
    pub base_uri: String,
    /// Object name appended to the base.
    pub name: String,
    /// Procedure name under the topic that serves snapshots.
    pub snapshot_method: String,
    /// How long a replica waits for the authority's snapshot.
    pub call_timeout_ms: u64,
    /// Broadcast the full state right after joining as authority.
    pub broadcast_on_join: bool,
    /// Options used for every publish without a per-operation override.
    pub publish_options: PublishOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_uri: "com".to_string(),
            name: String::new(),
            snapshot_method: "snapshot".to_string(),
            call_timeout_ms: 5_000,
            broadcast_on_join: false,
            publish_options: PublishOptions::default(),
        }
    }
}

impl SyncConfig {
    /// Default settings with the given object name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The container topic: base URI and name joined with `.`.
    pub fn topic(&self) -> Result<Topic, SyncError> {
        Ok(Topic::from_parts(&self.base_uri, &self.name)?)
    }

    /// Snapshot call timeout.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Check every field.
    pub fn validate(&self) -> Result<(), SyncError> {
        self.topic()?;
        validate_suffix(&self.snapshot_method)?;
        if self.call_timeout_ms == 0 {
            return Err(SyncError::InvalidConfig(
                "call_timeout_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Defaults overridden from `AUTOPUB_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(base_uri) = lookup(ENV_BASE_URI) {
            config.base_uri = base_uri;
        }
        if let Some(name) = lookup(ENV_NAME) {
            config.name = name;
        }
        if let Some(method) = lookup(ENV_SNAPSHOT_METHOD) {
            config.snapshot_method = method;
        }
        if let Some(timeout) = lookup(ENV_CALL_TIMEOUT_MS) {
            match timeout.parse() {
                Ok(ms) => config.call_timeout_ms = ms,
                Err(_) => warn!(
                    key = ENV_CALL_TIMEOUT_MS,
                    value = %timeout,
                    "Ignoring non-numeric timeout"
                ),
            }
        }
        if let Some(flag) = lookup(ENV_BROADCAST_ON_JOIN) {
            config.broadcast_on_join = flag == "1" || flag.eq_ignore_ascii_case("true");
        }

        config
    }
}

/// Fluent builder for [`SyncConfig`].
#[derive(Debug, Clone, Default)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.config.base_uri = base_uri.into();
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    #[must_use]
    pub fn snapshot_method(mut self, method: impl Into<String>) -> Self {
        self.config.snapshot_method = method.into();
        self
    }

    #[must_use]
    pub fn call_timeout(mut self, timeout: Duration) -> Self {
        self.config.call_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    #[must_use]
    pub fn broadcast_on_join(mut self, enabled: bool) -> Self {
        self.config.broadcast_on_join = enabled;
        self
    }

    #[must_use]
    pub fn publish_options(mut self, options: PublishOptions) -> Self {
        self.config.publish_options = options;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<SyncConfig, SyncError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
