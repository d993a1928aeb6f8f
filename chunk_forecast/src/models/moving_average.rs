//! Moving average model for time series forecasting

use crate::data::TimeSeriesWindow;
use crate::error::{ForecastError, Result};
use crate::models::{constant_forecast, ForecastModel, TrainedForecastModel};
use chrono::{DateTime, Utc};
use forecast_math::SimpleMovingAverage;

/// Simple Moving Average model
#[derive(Debug, Clone)]
pub struct MovingAverage {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
}

/// Trained Simple Moving Average model
#[derive(Debug, Clone)]
pub struct TrainedMovingAverage {
    /// Name of the model
    name: String,
    /// Mean of the last `window` training values
    last_average: f64,
}

impl MovingAverage {
    /// Create a new Simple Moving Average model
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Simple Moving Average (window={})", window),
            window,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl ForecastModel for MovingAverage {
    type Trained = TrainedMovingAverage;

    fn train(&self, window: &TimeSeriesWindow) -> Result<Self::Trained> {
        if window.len() < self.window {
            return Err(ForecastError::Fitting(format!(
                "Insufficient data for SMA. Need at least {} observations, have {}.",
                self.window,
                window.len()
            )));
        }

        let mut sma = SimpleMovingAverage::new(self.window)?;
        for observation in window.observations() {
            sma.update(observation.value);
        }

        Ok(TrainedMovingAverage {
            name: self.name.clone(),
            last_average: sma.value()?,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedMovingAverage {
    fn predict(&self, future: &[DateTime<Utc>]) -> Result<Vec<f64>> {
        constant_forecast(self.last_average, future)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
