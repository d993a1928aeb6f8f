//! Autoregressive models with differencing (ARIMA without the MA part)

use crate::data::TimeSeriesWindow;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, TrainedForecastModel};
use chrono::{DateTime, Utc};
use forecast_math::{difference, fit_autoregression, integrate, ArCoefficients};

/// AR(p) fitted on the `d`-times differenced series
#[derive(Debug, Clone)]
pub struct Autoregressive {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
}

/// Trained autoregressive model
#[derive(Debug, Clone)]
pub struct TrainedAutoregressive {
    name: String,
    d: usize,
    coefficients: ArCoefficients,
    /// Training values on the original scale
    history: Vec<f64>,
}

impl Autoregressive {
    /// Create a new model. `p` must be at least 1.
    pub fn new(p: usize, d: usize) -> Result<Self> {
        if p == 0 {
            return Err(ForecastError::InvalidParameter(
                "AR order p must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            name: format!("ARI({},{})", p, d),
            p,
            d,
        })
    }

    /// Smallest training window this model can be fitted on
    pub fn min_observations(&self) -> usize {
        2 * self.p + self.d + 1
    }
}

impl ForecastModel for Autoregressive {
    type Trained = TrainedAutoregressive;

    fn train(&self, window: &TimeSeriesWindow) -> Result<Self::Trained> {
        if window.len() < self.min_observations() {
            return Err(ForecastError::Fitting(format!(
                "Insufficient data for {}. Need at least {} observations, have {}.",
                self.name,
                self.min_observations(),
                window.len()
            )));
        }

        let history = window.values();
        let differenced = difference(&history, self.d);
        let coefficients = fit_autoregression(&differenced, self.p)?;

        Ok(TrainedAutoregressive {
            name: self.name.clone(),
            d: self.d,
            coefficients,
            history,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedAutoregressive {
    pub fn coefficients(&self) -> &ArCoefficients {
        &self.coefficients
    }
}

impl TrainedForecastModel for TrainedAutoregressive {
    fn predict(&self, future: &[DateTime<Utc>]) -> Result<Vec<f64>> {
        // one recursive step per future timestamp
        let differenced = difference(&self.history, self.d);
        let steps = self.coefficients.forecast(&differenced, future.len())?;
        let forecasts = integrate(&steps, &self.history, self.d)?;

        if forecasts.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Fitting(format!(
                "{} produced a non-finite forecast",
                self.name
            )));
        }

        Ok(forecasts)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
