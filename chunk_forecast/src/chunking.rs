//! Chunk assembly: turn long-format observations into per-key chunks

use crate::data::{
    column_strings, column_timestamps, column_values, Chunk, EvaluationWindow, Observation,
    TimeSeriesWindow,
};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// One observation of one entity in a long-format table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelRow {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Names of the key, time and value columns of a panel table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelColumns {
    pub key: String,
    pub time: String,
    pub value: String,
}

impl Default for PanelColumns {
    fn default() -> Self {
        Self {
            key: "ticker".to_string(),
            time: "t".to_string(),
            value: "c".to_string(),
        }
    }
}

/// How each key's series is split into training and evaluation windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SplitRule {
    /// The last `evaluation_len` observations are held out
    Holdout { evaluation_len: usize },
    /// The trailing `evaluation_ratio` share is held out (rounded)
    Ratio { evaluation_ratio: f64 },
}

impl Default for SplitRule {
    fn default() -> Self {
        SplitRule::Holdout { evaluation_len: 1 }
    }
}

impl SplitRule {
    pub fn validate(&self) -> Result<()> {
        match *self {
            SplitRule::Holdout { .. } => Ok(()),
            SplitRule::Ratio { evaluation_ratio } => {
                if evaluation_ratio > 0.0 && evaluation_ratio < 1.0 {
                    Ok(())
                } else {
                    Err(ForecastError::InvalidParameter(
                        "Evaluation ratio must be between 0 and 1".to_string(),
                    ))
                }
            }
        }
    }

    /// Number of trailing observations held out of a series of length `len`.
    /// At least one observation always stays in training.
    pub fn evaluation_len(&self, len: usize) -> usize {
        let held_out = match *self {
            SplitRule::Holdout { evaluation_len } => evaluation_len,
            SplitRule::Ratio { evaluation_ratio } => (len as f64 * evaluation_ratio).round() as usize,
        };
        held_out.min(len.saturating_sub(1))
    }
}

/// Load a long-format CSV (one row per key and timestamp) with polars
pub fn load_panel_csv<P: AsRef<Path>>(path: P, columns: &PanelColumns) -> Result<Vec<PanelRow>> {
    let file = File::open(path)?;
    let df = CsvReader::new(file)
        .infer_schema(None)
        .has_header(true)
        .finish()?;

    panel_from_dataframe(&df, columns)
}

/// Read panel rows out of an existing DataFrame
pub fn panel_from_dataframe(df: &DataFrame, columns: &PanelColumns) -> Result<Vec<PanelRow>> {
    let keys = column_strings(df, &columns.key)?;
    let timestamps = column_timestamps(df, &columns.time)?;
    let values = column_values(df, &columns.value)?;

    Ok(keys
        .into_iter()
        .zip(timestamps)
        .zip(values)
        .map(|((key, timestamp), value)| PanelRow {
            key,
            timestamp,
            value,
        })
        .collect())
}

/// Group rows by key (first-appearance order), sort each series by time and
/// split it into a chunk.
///
/// Every key needs at least two observations, and no key may repeat a
/// timestamp.
pub fn chunk_by_key(rows: &[PanelRow], rule: SplitRule) -> Result<Vec<Chunk>> {
    rule.validate()?;

    let mut order: Vec<&str> = Vec::new();
    let mut series: HashMap<&str, Vec<Observation>> = HashMap::new();
    for row in rows {
        series
            .entry(row.key.as_str())
            .or_insert_with(|| {
                order.push(row.key.as_str());
                Vec::new()
            })
            .push(Observation::new(row.timestamp, row.value));
    }

    let mut chunks = Vec::with_capacity(order.len());
    for key in order {
        let mut observations = series.remove(key).unwrap_or_default();
        if observations.len() < 2 {
            return Err(ForecastError::InvalidInput(format!(
                "Key '{}' has {} observation(s); at least 2 are needed to split",
                key,
                observations.len()
            )));
        }

        observations.sort_by_key(|o| o.timestamp);
        let held_out = rule.evaluation_len(observations.len());
        let evaluation = observations.split_off(observations.len() - held_out);

        debug!(
            "Key {}: {} training and {} evaluation observations",
            key,
            observations.len(),
            evaluation.len()
        );

        let training = TimeSeriesWindow::new(observations)
            .map_err(|e| ForecastError::InvalidInput(format!("Key '{}': {}", key, e)))?;
        let evaluation = EvaluationWindow::new(evaluation)
            .map_err(|e| ForecastError::InvalidInput(format!("Key '{}': {}", key, e)))?;
        chunks.push(Chunk::new(key, training, evaluation)?);
    }

    Ok(chunks)
}
