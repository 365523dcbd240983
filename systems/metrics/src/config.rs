//! TOML configuration for the scoring pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::MetricKind;

/// Largest room the generator places by default: 4x4 tiles.
pub const DEFAULT_MAX_ROOM_AREA: u64 = 16;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid TOML for this schema.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Two metrics in one suite share a display title.
    #[error("duplicate metric title: {0}")]
    DuplicateMetric(&'static str),

    /// The configuration parsed but describes an unusable suite.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Selects the metrics a suite scores and their tuning constants.
///
/// ```toml
/// max_room_area = 16
/// metrics = ["density", "exploration", "map_linearity"]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "snake_case")]
pub struct MetricsConfig {
    /// Area of the largest room the generator may place, used by average room size.
    pub max_room_area: u64,

    /// Metrics to score, in reporting order.
    pub metrics: Vec<MetricKind>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            max_room_area: DEFAULT_MAX_ROOM_AREA,
            metrics: MetricKind::ALL.to_vec(),
        }
    }
}

impl MetricsConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot produce a usable suite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_room_area == 0 {
            return Err(ConfigError::Invalid(
                "max_room_area must be greater than zero".to_owned(),
            ));
        }
        if self.metrics.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one metric must be enabled".to_owned(),
            ));
        }

        Ok(())
    }
}
