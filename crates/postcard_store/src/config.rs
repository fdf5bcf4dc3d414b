//! Store configuration.
//!
//! # Responsibility
//! - Hold tunables shared by connection bootstrap and repositories.
//! - Parse and validate JSON configuration documents.
//!
//! # Invariants
//! - `max_image_bytes` is always greater than zero.
//! - `default_list_limit` never exceeds `max_list_limit`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_MAX_IMAGE_BYTES: usize = 16 * 1024 * 1024;
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_LIST_LIMIT: u32 = 50;
const MAX_LIST_LIMIT: u32 = 500;

/// Runtime configuration for store connections and repositories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Largest accepted image payload in bytes, for both source images and
    /// rendered postcards.
    pub max_image_bytes: usize,
    /// How long a connection waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    /// Page size used when a list query does not set a limit.
    pub default_list_limit: u32,
    /// Upper bound applied to list query limits.
    pub max_list_limit: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            default_list_limit: DEFAULT_LIST_LIMIT,
            max_list_limit: MAX_LIST_LIMIT,
        }
    }
}

impl StoreConfig {
    /// Parses a JSON document and validates the result.
    ///
    /// Missing fields fall back to defaults; unknown fields are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_image_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_image_bytes must be greater than zero".to_string(),
            ));
        }
        if self.max_list_limit == 0 {
            return Err(ConfigError::Invalid(
                "max_list_limit must be greater than zero".to_string(),
            ));
        }
        if self.default_list_limit == 0 || self.default_list_limit > self.max_list_limit {
            return Err(ConfigError::Invalid(format!(
                "default_list_limit must be within 1..={}, got {}",
                self.max_list_limit, self.default_list_limit
            )));
        }
        Ok(())
    }

    /// Busy timeout as a `Duration`.
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }

    /// Normalizes a caller-provided list limit.
    ///
    /// `None` and `Some(0)` map to the default; larger values clamp to the max.
    pub fn normalize_list_limit(&self, limit: Option<u32>) -> u32 {
        match limit {
            Some(0) | None => self.default_list_limit,
            Some(value) if value > self.max_list_limit => self.max_list_limit,
            Some(value) => value,
        }
    }
}

/// Configuration loading error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for `StoreConfig`.
    Parse(String),
    /// The document parsed but violates an invariant.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(message) => write!(f, "failed to parse store config: {message}"),
            Self::Invalid(message) => write!(f, "invalid store config: {message}"),
        }
    }
}

impl Error for ConfigError {}
