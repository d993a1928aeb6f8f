//! Exponential smoothing models for time series forecasting

use crate::data::TimeSeriesWindow;
use crate::error::{ForecastError, Result};
use crate::models::{constant_forecast, ForecastModel, TrainedForecastModel};
use chrono::{DateTime, Utc};
use forecast_math::smoothing;

/// Simple exponential smoothing model
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
}

/// Trained exponential smoothing model
#[derive(Debug, Clone)]
pub struct TrainedExponentialSmoothing {
    /// Name of the model
    name: String,
    /// Smoothing parameter
    alpha: f64,
    /// Level after the final training observation
    level: f64,
}

impl ExponentialSmoothing {
    /// Create a new exponential smoothing model
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ForecastError::InvalidParameter(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Exponential Smoothing (alpha={})", alpha),
            alpha,
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl ForecastModel for ExponentialSmoothing {
    type Trained = TrainedExponentialSmoothing;

    fn train(&self, window: &TimeSeriesWindow) -> Result<Self::Trained> {
        let mut smoother = smoothing::ExponentialSmoothing::new(self.alpha)?;
        for observation in window.observations() {
            smoother.update(observation.value);
        }

        Ok(TrainedExponentialSmoothing {
            name: self.name.clone(),
            alpha: self.alpha,
            level: smoother.level()?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedExponentialSmoothing {
    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl TrainedForecastModel for TrainedExponentialSmoothing {
    fn predict(&self, future: &[DateTime<Utc>]) -> Result<Vec<f64>> {
        // the forecast is constant at the last level
        constant_forecast(self.level, future)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
