//! Joined forecasts: ground truth next to the model's prediction

use crate::data::EvaluationWindow;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::io::Write;

/// One joined row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub timestamp: DateTime<Utc>,
    pub actual: f64,
    pub predicted: f64,
}

/// Forecast for one chunk, restricted to timestamps present in both the
/// evaluation window and the predicted horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    chunk_index: usize,
    key: String,
    rows: Vec<ForecastRow>,
}

impl ForecastResult {
    pub fn new(chunk_index: usize, key: impl Into<String>, rows: Vec<ForecastRow>) -> Self {
        Self {
            chunk_index,
            key: key.into(),
            rows,
        }
    }

    /// Inner join of `evaluation` with `(future[i], predictions[i])` on exact
    /// timestamp. Both sides must be sorted ascending, which windows and
    /// generated horizons always are.
    pub fn join(
        chunk_index: usize,
        key: impl Into<String>,
        evaluation: &EvaluationWindow,
        future: &[DateTime<Utc>],
        predictions: &[f64],
    ) -> Result<Self> {
        if future.len() != predictions.len() {
            return Err(ForecastError::Fitting(format!(
                "Model returned {} predictions for {} future timestamps",
                predictions.len(),
                future.len()
            )));
        }

        let actuals = evaluation.observations();
        let mut rows = Vec::with_capacity(future.len().min(actuals.len()));
        let (mut i, mut j) = (0, 0);

        while i < actuals.len() && j < future.len() {
            match actuals[i].timestamp.cmp(&future[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    rows.push(ForecastRow {
                        timestamp: future[j],
                        actual: actuals[i].value,
                        predicted: predictions[j],
                    });
                    i += 1;
                    j += 1;
                }
            }
        }

        Ok(Self::new(chunk_index, key, rows))
    }

    /// Position of the source chunk in the input batch
    pub fn chunk_index(&self) -> usize {
        self.chunk_index
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn rows(&self) -> &[ForecastRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.rows.iter().map(|r| r.timestamp).collect()
    }

    pub fn actuals(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.actual).collect()
    }

    pub fn predictions(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.predicted).collect()
    }

    /// Columns `key`, `ds` (millisecond Datetime), `y` and `yhat`
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        results_to_dataframe(std::slice::from_ref(self))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Stack several results into one long DataFrame
pub fn results_to_dataframe(results: &[ForecastResult]) -> Result<DataFrame> {
    let total: usize = results.iter().map(ForecastResult::len).sum();
    let mut keys = Vec::with_capacity(total);
    let mut millis = Vec::with_capacity(total);
    let mut actuals = Vec::with_capacity(total);
    let mut predictions = Vec::with_capacity(total);

    for result in results {
        for row in result.rows() {
            keys.push(result.key().to_string());
            millis.push(row.timestamp.timestamp_millis());
            actuals.push(row.actual);
            predictions.push(row.predicted);
        }
    }

    let ds = Series::new("ds", millis).cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    Ok(DataFrame::new(vec![
        Series::new("key", keys),
        ds,
        Series::new("y", actuals),
        Series::new("yhat", predictions),
    ])?)
}

#[derive(Serialize)]
struct CsvRecord<'a> {
    chunk: usize,
    key: &'a str,
    ds: String,
    y: f64,
    yhat: f64,
}

/// Write every joined row as CSV with a header line
pub fn write_results_csv<W: Write>(results: &[ForecastResult], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for result in results {
        for row in result.rows() {
            csv_writer.serialize(CsvRecord {
                chunk: result.chunk_index(),
                key: result.key(),
                ds: row.timestamp.to_rfc3339(),
                y: row.actual,
                yhat: row.predicted,
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
