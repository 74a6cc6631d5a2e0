use crate::error::{GaitError, Result};
use crate::frame::RATIO_EPSILON;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for a recording session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecorderConfig {
    /// Minimum time between two counted steps (ms)
    pub step_debounce_ms: f64,

    /// Smallest time delta the hips tracker will differentiate over (s)
    pub min_dt: f64,

    /// Floor applied to leg length before dividing ratios by it
    pub ratio_epsilon: f64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            step_debounce_ms: 120.0,
            min_dt: 1e-6,
            ratio_epsilon: RATIO_EPSILON,
        }
    }
}

impl RecorderConfig {
    /// Load a config from a JSON file; missing keys fall back to defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.step_debounce_ms.is_finite() || self.step_debounce_ms < 0.0 {
            return Err(GaitError::Config(format!(
                "step_debounce_ms must be a finite value >= 0, got {}",
                self.step_debounce_ms
            )));
        }
        if self.min_dt.is_nan() || self.min_dt <= 0.0 {
            return Err(GaitError::Config(format!(
                "min_dt must be positive, got {}",
                self.min_dt
            )));
        }
        if self.ratio_epsilon.is_nan() || self.ratio_epsilon <= 0.0 {
            return Err(GaitError::Config(format!(
                "ratio_epsilon must be positive, got {}",
                self.ratio_epsilon
            )));
        }
        Ok(())
    }
}
