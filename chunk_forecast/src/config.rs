//! Runner and pipeline configuration
//!
//! Everything is passed per invocation; nothing here is global. A pipeline
//! configuration can be loaded from (and saved to) TOML:
//!
//! ```toml
//! [runner]
//! horizon = 5
//! frequency = "1min"
//! parallel = true
//!
//! [model]
//! kind = "autoregressive"
//! p = 2
//! d = 1
//!
//! [split]
//! rule = "holdout"
//! evaluation_len = 5
//!
//! [columns]
//! key = "ticker"
//! time = "t"
//! value = "c"
//! ```

use crate::chunking::{PanelColumns, SplitRule};
use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use crate::models::ModelSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Per-invocation settings of the chunked forecast runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Number of future steps predicted past each training window
    pub horizon: usize,
    /// Step between future timestamps
    pub frequency: Frequency,
    /// Redirect stdout/stderr to the null device while models fit
    pub silence_fitting: bool,
    /// Fit chunks on the rayon thread pool
    pub parallel: bool,
    /// Record per-chunk failures instead of aborting the batch
    pub isolate_failures: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            horizon: 1,
            frequency: Frequency::default(),
            silence_fitting: true,
            parallel: false,
            isolate_failures: false,
        }
    }
}

/// Largest accepted forecast horizon
pub const MAX_HORIZON: usize = 1_000_000;

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be at least 1".to_string(),
            ));
        }
        if self.horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidParameter(format!(
                "Horizon {} exceeds the maximum of {}",
                self.horizon, MAX_HORIZON
            )));
        }
        Ok(())
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_silence_fitting(mut self, silence_fitting: bool) -> Self {
        self.silence_fitting = silence_fitting;
        self
    }
}

/// Full configuration of a forecast run from panel data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub runner: RunnerConfig,
    pub model: ModelSpec,
    pub split: SplitRule,
    pub columns: PanelColumns,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        self.runner.validate()?;
        self.model.validate()?;
        self.split.validate()?;
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(contents)
            .map_err(|e| ForecastError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ForecastError::Config(format!("Failed to read config: {}", e)))?;
        Self::from_toml_str(&contents)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(self)
            .map_err(|e| ForecastError::Config(format!("Failed to serialize: {}", e)))?;
        std::fs::write(path, toml_str)
            .map_err(|e| ForecastError::Config(format!("Failed to write config: {}", e)))?;
        Ok(())
    }
}
