//! Forecasting models for chunk training windows
//!
//! A [`ForecastModel`] is an unfitted description: training it on a window
//! produces a brand-new [`TrainedForecastModel`], so nothing learned on one
//! chunk can leak into the next.

use crate::data::TimeSeriesWindow;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod autoregressive;
pub mod exponential_smoothing;
pub mod linear_trend;
pub mod moving_average;

pub use autoregressive::Autoregressive;
pub use exponential_smoothing::ExponentialSmoothing;
pub use linear_trend::LinearTrend;
pub use moving_average::MovingAverage;

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Point prediction for each future timestamp.
    ///
    /// `future` holds consecutive forecast steps starting right after the
    /// training window; the returned vector has the same length.
    fn predict(&self, future: &[DateTime<Utc>]) -> Result<Vec<f64>>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a time series window
pub trait ForecastModel: Debug + Sync {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Fit a fresh model to `window`
    fn train(&self, window: &TimeSeriesWindow) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

impl<T: TrainedForecastModel + ?Sized> TrainedForecastModel for Box<T> {
    fn predict(&self, future: &[DateTime<Utc>]) -> Result<Vec<f64>> {
        (**self).predict(future)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Model selection as it appears in configuration files
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    #[default]
    LinearTrend,
    ExponentialSmoothing {
        alpha: f64,
    },
    MovingAverage {
        window: usize,
    },
    Autoregressive {
        p: usize,
        #[serde(default)]
        d: usize,
    },
}

impl ModelSpec {
    /// Check parameters without fitting anything
    pub fn validate(&self) -> Result<()> {
        match *self {
            ModelSpec::LinearTrend => Ok(()),
            ModelSpec::ExponentialSmoothing { alpha } => {
                ExponentialSmoothing::new(alpha).map(|_| ())
            }
            ModelSpec::MovingAverage { window } => MovingAverage::new(window).map(|_| ()),
            ModelSpec::Autoregressive { p, d } => Autoregressive::new(p, d).map(|_| ()),
        }
    }
}

impl ForecastModel for ModelSpec {
    type Trained = Box<dyn TrainedForecastModel>;

    fn train(&self, window: &TimeSeriesWindow) -> Result<Self::Trained> {
        Ok(match *self {
            ModelSpec::LinearTrend => Box::new(LinearTrend::new().train(window)?),
            ModelSpec::ExponentialSmoothing { alpha } => {
                Box::new(ExponentialSmoothing::new(alpha)?.train(window)?)
            }
            ModelSpec::MovingAverage { window: size } => {
                Box::new(MovingAverage::new(size)?.train(window)?)
            }
            ModelSpec::Autoregressive { p, d } => Box::new(Autoregressive::new(p, d)?.train(window)?),
        })
    }

    fn name(&self) -> &str {
        match self {
            ModelSpec::LinearTrend => "linear_trend",
            ModelSpec::ExponentialSmoothing { .. } => "exponential_smoothing",
            ModelSpec::MovingAverage { .. } => "moving_average",
            ModelSpec::Autoregressive { .. } => "autoregressive",
        }
    }
}

/// Flat forecast shared by the level-based models
pub(crate) fn constant_forecast(value: f64, future: &[DateTime<Utc>]) -> Result<Vec<f64>> {
    if !value.is_finite() {
        return Err(ForecastError::Fitting(format!(
            "Model level is not finite ({})",
            value
        )));
    }
    Ok(vec![value; future.len()])
}
