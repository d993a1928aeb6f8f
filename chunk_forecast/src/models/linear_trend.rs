//! Linear trend model: a least-squares line of value against elapsed time

use crate::data::TimeSeriesWindow;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, TrainedForecastModel};
use chrono::{DateTime, Utc};
use forecast_math::{fit_line, LineFit};

/// Trend model fitted on wall-clock time, so irregular sampling and any
/// forecast frequency are handled the same way.
#[derive(Debug, Clone)]
pub struct LinearTrend {
    name: String,
}

/// Trained linear trend model
#[derive(Debug, Clone)]
pub struct TrainedLinearTrend {
    name: String,
    /// Timestamp mapped to x = 0
    origin: DateTime<Utc>,
    fit: LineFit,
}

impl LinearTrend {
    pub fn new() -> Self {
        Self {
            name: "Linear Trend".to_string(),
        }
    }
}

impl Default for LinearTrend {
    fn default() -> Self {
        Self::new()
    }
}

fn elapsed_seconds(origin: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
    (t - origin).num_milliseconds() as f64 / 1000.0
}

impl ForecastModel for LinearTrend {
    type Trained = TrainedLinearTrend;

    fn train(&self, window: &TimeSeriesWindow) -> Result<Self::Trained> {
        if window.len() < 2 {
            return Err(ForecastError::Fitting(format!(
                "Training window has fewer than 2 observations ({})",
                window.len()
            )));
        }

        let origin = window.first_timestamp();
        let xs: Vec<f64> = window
            .observations()
            .iter()
            .map(|o| elapsed_seconds(origin, o.timestamp))
            .collect();
        let fit = fit_line(&xs, &window.values())?;

        Ok(TrainedLinearTrend {
            name: self.name.clone(),
            origin,
            fit,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedLinearTrend {
    /// Fitted change in value per second
    pub fn slope_per_second(&self) -> f64 {
        self.fit.slope
    }

    pub fn fit(&self) -> &LineFit {
        &self.fit
    }
}

impl TrainedForecastModel for TrainedLinearTrend {
    fn predict(&self, future: &[DateTime<Utc>]) -> Result<Vec<f64>> {
        Ok(future
            .iter()
            .map(|&t| self.fit.value_at(elapsed_seconds(self.origin, t)))
            .collect())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone};

    fn minute(m: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 1, 4, 0, 0, 0).unwrap() + Duration::minutes(m)
    }

    #[test]
    fn test_extends_linear_series() {
        let window = TimeSeriesWindow::from_parts(
            (0..10).map(minute).collect(),
            (1..=10).map(f64::from).collect(),
        )
        .unwrap();

        let trained = LinearTrend::new().train(&window).unwrap();
        let predicted = trained.predict(&[minute(10), minute(11)]).unwrap();

        assert_relative_eq!(predicted[0], 11.0, epsilon = 1e-9);
        assert_relative_eq!(predicted[1], 12.0, epsilon = 1e-9);
        assert_relative_eq!(trained.slope_per_second(), 1.0 / 60.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_observation_fails_to_fit() {
        let window = TimeSeriesWindow::from_parts(vec![minute(0)], vec![5.0]).unwrap();
        let result = LinearTrend::new().train(&window);
        assert!(matches!(result, Err(ForecastError::Fitting(_))));
    }
}
