//! Runtime configuration for the reaction subsystem.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// How long a reaction stays visible, absent a newer one.
pub const DEFAULT_TTL_MS: u64 = 10_000;

/// Buffered change notifications per subscriber before it starts lagging.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Reaction settings, loaded from JSON. Missing fields take their defaults.
///
/// ```json
/// { "ttl_ms": 10000, "feed_capacity": 64 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReactionConfig {
    pub ttl_ms: u64,
    pub feed_capacity: usize,
}

impl Default for ReactionConfig {
    fn default() -> Self {
        Self {
            ttl_ms: DEFAULT_TTL_MS,
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

impl ReactionConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: ReactionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// `ttl_ms` as a `Duration`.
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    /// Reject a zero TTL or a zero feed capacity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_ms == 0 {
            return Err(ConfigError::Invalid("ttl_ms must be greater than 0".into()));
        }
        if self.feed_capacity == 0 {
            return Err(ConfigError::Invalid(
                "feed_capacity must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}
