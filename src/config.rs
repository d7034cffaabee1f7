//! Pipeline configuration
//!
//! Configuration is optional: a [`PipelineConfig`] can be built in code, taken
//! from `Default`, or parsed from JSON where every field falls back to its
//! default.

use serde::{Deserialize, Serialize};

use crate::error::{PipeError, PipeResult};
use crate::logger::LogLevel;

fn default_name() -> String {
    "pipeline".to_string()
}

fn default_collect_stats() -> bool {
    true
}

/// Settings for a named [`crate::pipeline::Pipeline`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Pipeline name used in logs and run reports
    #[serde(default = "default_name")]
    pub name: String,

    /// Level of the per-run start/complete log lines
    #[serde(default)]
    pub log_level: LogLevel,

    /// Whether `run` snapshots stage counters into its report
    #[serde(default = "default_collect_stats")]
    pub collect_stats: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: LogLevel::default(),
            collect_stats: default_collect_stats(),
        }
    }
}

impl PipelineConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> PipeResult<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipeResult<()> {
        if self.name.trim().is_empty() {
            return Err(PipeError::ConfigError(
                "pipeline name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
