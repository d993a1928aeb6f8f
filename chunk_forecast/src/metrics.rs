//! Metrics for evaluating forecast performance

use crate::error::{ForecastError, Result};
use crate::result::ForecastResult;
use serde::Serialize;
use statrs::statistics::Statistics;

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    /// Number of joined rows evaluated
    pub count: usize,
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (rows with a zero actual are skipped)
    pub mape: f64,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
    /// Mean of `actual - predicted`; positive means the model under-forecasts
    pub bias: f64,
}

/// Calculate accuracy metrics for predictions against actual values
pub fn forecast_accuracy(predicted: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if predicted.len() != actual.len() || predicted.is_empty() {
        return Err(ForecastError::InvalidInput(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let errors: Vec<f64> = predicted
        .iter()
        .zip(actual)
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).mean();
    let mse = errors.iter().map(|e| e.powi(2)).mean();

    let percentage_errors: Vec<f64> = actual
        .iter()
        .zip(&errors)
        .filter(|&(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .collect();
    let mape = if percentage_errors.is_empty() {
        0.0
    } else {
        percentage_errors.iter().mean()
    };

    let smape = actual
        .iter()
        .zip(predicted)
        .map(|(&a, &f)| {
            let denominator = a.abs() + f.abs();
            if denominator == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denominator
            }
        })
        .mean();

    Ok(ForecastAccuracy {
        count: predicted.len(),
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape,
        bias: errors.iter().mean(),
    })
}

/// Accuracy of one chunk's joined rows; `None` when the join came back empty
pub fn evaluate(result: &ForecastResult) -> Option<ForecastAccuracy> {
    if result.is_empty() {
        return None;
    }
    forecast_accuracy(&result.predictions(), &result.actuals()).ok()
}

/// Pool every joined row of a batch into one accuracy record
pub fn summarize(results: &[ForecastResult]) -> Option<ForecastAccuracy> {
    let predicted: Vec<f64> = results.iter().flat_map(|r| r.predictions()).collect();
    let actual: Vec<f64> = results.iter().flat_map(|r| r.actuals()).collect();

    if predicted.is_empty() {
        return None;
    }
    forecast_accuracy(&predicted, &actual).ok()
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics ({} rows):", self.count)?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        writeln!(f, "  MAPE:  {:.4}%", self.mape)?;
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        writeln!(f, "  Bias:  {:.4}", self.bias)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ForecastRow;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_forecast_accuracy() {
        let accuracy = forecast_accuracy(&[10.0, 20.0, 30.0], &[12.0, 18.0, 30.0]).unwrap();

        assert_eq!(accuracy.count, 3);
        assert_relative_eq!(accuracy.mae, 4.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(accuracy.mse, 8.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(accuracy.rmse, (8.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_relative_eq!(accuracy.bias, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mape_skips_zero_actuals() {
        let accuracy = forecast_accuracy(&[1.0, 110.0], &[0.0, 100.0]).unwrap();
        assert_relative_eq!(accuracy.mape, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mismatched_lengths() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }

    #[test]
    fn test_evaluate_and_summarize() {
        let start = Utc.with_ymd_and_hms(2021, 1, 4, 0, 0, 0).unwrap();
        let row = |m: i64, actual: f64, predicted: f64| ForecastRow {
            timestamp: start + Duration::minutes(m),
            actual,
            predicted,
        };

        let results = vec![
            ForecastResult::new(0, "AAPL", vec![row(10, 11.0, 10.0)]),
            ForecastResult::new(1, "EMPTY", Vec::new()),
            ForecastResult::new(2, "MSFT", vec![row(5, 6.0, 9.0)]),
        ];

        assert!(evaluate(&results[1]).is_none());
        assert_relative_eq!(evaluate(&results[0]).unwrap().mae, 1.0);

        let pooled = summarize(&results).unwrap();
        assert_eq!(pooled.count, 2);
        assert_relative_eq!(pooled.mae, 2.0);
        assert!(summarize(&results[1..2]).is_none());
    }
}
