//! Pipeline configuration.

use crate::classifier::{RetryBudget, DEFAULT_NUM_TRIES};
use crate::machine::DEFAULT_INITIAL_EPSILON;
use crate::query::{EventScope, PayloadOptions, WindowOptions};
use crate::tracks::{ObjectFilter, SkipRule};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Default upper bound on a classifier segment, in seconds.
pub const DEFAULT_MAX_SEGMENT_LENGTH: f64 = 120.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_segment_length must be positive and finite, got {0}")]
    InvalidSegmentLength(f64),

    #[error("initial_epsilon must be finite and non-negative, got {0}")]
    InvalidEpsilon(f64),

    #[error("num_tries must be at least 1")]
    ZeroTries,

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings for replay, querying and classification.
///
/// Every field has a default, so a config file only needs to name what it
/// changes.
///
/// # Example
///
/// ```rust
/// use scenegraph_usage::config::PipelineConfig;
///
/// let config = PipelineConfig::from_json(r#"{"max_segment_length": 60}"#).unwrap();
/// assert_eq!(config.max_segment_length, 60.0);
/// assert_eq!(config.num_tries, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub max_segment_length: f64,
    pub skip_rule: SkipRule,
    /// How far before the first event the `INITIAL` snapshot is placed.
    pub initial_epsilon: f64,
    pub event_scope: EventScope,
    /// Attach the full pre-action scene graph to every event record.
    pub include_full_scene_graph: bool,
    /// Render nodes without objects in prompts.
    pub show_empty_nodes: bool,
    pub num_tries: usize,
    pub attempt_timeout_secs: Option<u64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_segment_length: DEFAULT_MAX_SEGMENT_LENGTH,
            skip_rule: SkipRule::default(),
            initial_epsilon: DEFAULT_INITIAL_EPSILON,
            event_scope: EventScope::default(),
            include_full_scene_graph: false,
            show_empty_nodes: false,
            num_tries: DEFAULT_NUM_TRIES,
            attempt_timeout_secs: None,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_segment_length.is_finite() || self.max_segment_length <= 0.0 {
            return Err(ConfigError::InvalidSegmentLength(self.max_segment_length));
        }
        if !self.initial_epsilon.is_finite() || self.initial_epsilon < 0.0 {
            return Err(ConfigError::InvalidEpsilon(self.initial_epsilon));
        }
        if self.num_tries == 0 {
            return Err(ConfigError::ZeroTries);
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn object_filter(&self) -> ObjectFilter {
        ObjectFilter::from_rule(self.skip_rule.clone())
    }

    pub fn window_options(&self) -> WindowOptions {
        WindowOptions {
            scope: self.event_scope,
            include_full_scene_graph: self.include_full_scene_graph,
        }
    }

    pub fn payload_options(&self, video_end: Option<f64>) -> PayloadOptions {
        PayloadOptions {
            max_segment_length: self.max_segment_length,
            window: self.window_options(),
            video_end,
        }
    }

    pub fn retry_budget(&self) -> RetryBudget {
        let budget = RetryBudget::new(self.num_tries);
        match self.attempt_timeout_secs {
            Some(secs) => budget.with_timeout(Duration::from_secs(secs)),
            None => budget,
        }
    }
}
