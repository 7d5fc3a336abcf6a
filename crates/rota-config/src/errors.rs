use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

/// Error registry bounds and message catalog source
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorsConfig {
    /// Maximum number of live trace chains
    #[serde(default = "default_registry_capacity")]
    pub registry_capacity: u64,
    /// How long an unreleased chain is kept, e.g. `"5m"`
    #[serde(default = "default_registry_ttl")]
    pub registry_ttl: String,
    /// Replace the embedded message catalog with this JSON file
    pub catalog_path: Option<PathBuf>,
}

impl ErrorsConfig {
    /// Parsed registry TTL
    ///
    /// # Errors
    ///
    /// Returns an error if `registry_ttl` is not a valid duration
    pub fn registry_ttl(&self) -> anyhow::Result<Duration> {
        duration_str::parse(&self.registry_ttl)
            .map_err(|e| anyhow::anyhow!("invalid errors.registry_ttl '{}': {e}", self.registry_ttl))
    }
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            registry_capacity: default_registry_capacity(),
            registry_ttl: default_registry_ttl(),
            catalog_path: None,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_registry_capacity() -> u64 {
    10_000
}

fn default_registry_ttl() -> String {
    "5m".to_string()
}
