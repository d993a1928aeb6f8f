//! Time series windows and chunks consumed by the runner

use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One timestamped value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Checks shared by both window kinds: finite values, strictly increasing timestamps
fn validate_observations(observations: &[Observation], what: &str) -> Result<()> {
    if let Some(bad) = observations.iter().find(|o| !o.value.is_finite()) {
        return Err(ForecastError::InvalidInput(format!(
            "{} has a non-finite value at {}",
            what, bad.timestamp
        )));
    }

    if let Some(pair) = observations
        .windows(2)
        .find(|pair| pair[1].timestamp <= pair[0].timestamp)
    {
        return Err(ForecastError::InvalidInput(format!(
            "{} timestamps must be strictly increasing ({} is followed by {})",
            what, pair[0].timestamp, pair[1].timestamp
        )));
    }

    Ok(())
}

fn zip_observations(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Vec<Observation>> {
    if timestamps.len() != values.len() {
        return Err(ForecastError::InvalidInput(format!(
            "Timestamps length ({}) doesn't match values length ({})",
            timestamps.len(),
            values.len()
        )));
    }

    Ok(timestamps
        .into_iter()
        .zip(values)
        .map(|(timestamp, value)| Observation { timestamp, value })
        .collect())
}

/// Model-fitting input: at least one observation, strictly increasing timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct TimeSeriesWindow {
    observations: Vec<Observation>,
}

impl TimeSeriesWindow {
    /// Create a training window, rejecting empty or unordered input
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForecastError::InvalidInput(
                "Training window must contain at least one observation".to_string(),
            ));
        }
        validate_observations(&observations, "Training window")?;

        Ok(Self { observations })
    }

    /// Create a training window from parallel timestamp and value vectors
    pub fn from_parts(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        Self::new(zip_observations(timestamps, values)?)
    }

    /// Create a training window from two columns of a DataFrame
    pub fn from_dataframe(df: &DataFrame, time_column: &str, value_column: &str) -> Result<Self> {
        Self::from_parts(
            column_timestamps(df, time_column)?,
            column_values(df, value_column)?,
        )
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.observations.iter().map(|o| o.timestamp).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.observations.iter().map(|o| o.value).collect()
    }

    pub fn first_timestamp(&self) -> DateTime<Utc> {
        self.observations[0].timestamp
    }

    /// Last training timestamp; the forecast horizon starts one step after it
    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.observations[self.observations.len() - 1].timestamp
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Always false: a training window holds at least one observation
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl TryFrom<Vec<Observation>> for TimeSeriesWindow {
    type Error = ForecastError;

    fn try_from(observations: Vec<Observation>) -> Result<Self> {
        Self::new(observations)
    }
}

impl From<TimeSeriesWindow> for Vec<Observation> {
    fn from(window: TimeSeriesWindow) -> Self {
        window.observations
    }
}

/// Ground truth for the forecast horizon; may be empty
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Observation>", into = "Vec<Observation>")]
pub struct EvaluationWindow {
    observations: Vec<Observation>,
}

impl EvaluationWindow {
    pub fn new(observations: Vec<Observation>) -> Result<Self> {
        validate_observations(&observations, "Evaluation window")?;
        Ok(Self { observations })
    }

    pub fn from_parts(timestamps: Vec<DateTime<Utc>>, actuals: Vec<f64>) -> Result<Self> {
        Self::new(zip_observations(timestamps, actuals)?)
    }

    pub fn from_dataframe(df: &DataFrame, time_column: &str, value_column: &str) -> Result<Self> {
        Self::from_parts(
            column_timestamps(df, time_column)?,
            column_values(df, value_column)?,
        )
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.observations.first().map(|o| o.timestamp)
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

impl TryFrom<Vec<Observation>> for EvaluationWindow {
    type Error = ForecastError;

    fn try_from(observations: Vec<Observation>) -> Result<Self> {
        Self::new(observations)
    }
}

impl From<EvaluationWindow> for Vec<Observation> {
    fn from(window: EvaluationWindow) -> Self {
        window.observations
    }
}

/// One independent forecasting unit: a training window and the ground truth
/// that follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    key: String,
    training: TimeSeriesWindow,
    evaluation: EvaluationWindow,
}

impl Chunk {
    /// Pair a training window with its evaluation window. Every evaluation
    /// timestamp must come after the last training timestamp.
    pub fn new(
        key: impl Into<String>,
        training: TimeSeriesWindow,
        evaluation: EvaluationWindow,
    ) -> Result<Self> {
        let key = key.into();
        if let Some(first) = evaluation.first_timestamp() {
            if first <= training.last_timestamp() {
                return Err(ForecastError::InvalidInput(format!(
                    "Chunk '{}': evaluation starts at {} but training runs until {}",
                    key,
                    first,
                    training.last_timestamp()
                )));
            }
        }

        Ok(Self {
            key,
            training,
            evaluation,
        })
    }

    /// Entity label (ticker, sentiment bucket, ...)
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn training(&self) -> &TimeSeriesWindow {
        &self.training
    }

    pub fn evaluation(&self) -> &EvaluationWindow {
        &self.evaluation
    }
}

/// Read a time column as UTC timestamps.
///
/// Accepts Datetime, Date, integer epoch milliseconds, and strings in RFC 3339,
/// `%Y-%m-%d %H:%M:%S` or `%Y-%m-%d` form. Nulls are rejected.
pub fn column_timestamps(df: &DataFrame, column_name: &str) -> Result<Vec<DateTime<Utc>>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Data(format!("Column '{}' not found: {}", column_name, e))
    })?;

    match col.dtype() {
        DataType::Utf8 => col
            .utf8()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                let text = value.ok_or_else(|| null_error(column_name, row))?;
                parse_timestamp(text).ok_or_else(|| {
                    ForecastError::Data(format!(
                        "Column '{}' row {}: cannot parse '{}' as a timestamp",
                        column_name, row, text
                    ))
                })
            })
            .collect(),
        DataType::Datetime(_, _)
        | DataType::Date
        | DataType::Int64
        | DataType::Int32
        | DataType::UInt32
        | DataType::UInt64 => {
            let millis = col
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
                .cast(&DataType::Int64)?;
            millis
                .i64()?
                .into_iter()
                .enumerate()
                .map(|(row, value)| {
                    let ms = value.ok_or_else(|| null_error(column_name, row))?;
                    Utc.timestamp_millis_opt(ms).single().ok_or_else(|| {
                        ForecastError::Data(format!(
                            "Column '{}' row {}: {} is out of range",
                            column_name, row, ms
                        ))
                    })
                })
                .collect()
        }
        other => Err(ForecastError::Data(format!(
            "Column '{}' has type {} which cannot hold timestamps",
            column_name, other
        ))),
    }
}

/// Read a numeric column as f64. Nulls are rejected.
pub fn column_values(df: &DataFrame, column_name: &str) -> Result<Vec<f64>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Data(format!("Column '{}' not found: {}", column_name, e))
    })?;

    if !col.dtype().is_numeric() {
        return Err(ForecastError::Data(format!(
            "Column '{}' cannot be converted to f64",
            column_name
        )));
    }

    let values = col.cast(&DataType::Float64)?;
    values
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| value.ok_or_else(|| null_error(column_name, row)))
        .collect()
}

/// Read a column as strings; non-string columns are rendered with their display form
pub fn column_strings(df: &DataFrame, column_name: &str) -> Result<Vec<String>> {
    let col = df.column(column_name).map_err(|e| {
        ForecastError::Data(format!("Column '{}' not found: {}", column_name, e))
    })?;

    let text = col.cast(&DataType::Utf8)?;
    text.utf8()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(str::to_string)
                .ok_or_else(|| null_error(column_name, row))
        })
        .collect()
}

fn null_error(column_name: &str, row: usize) -> ForecastError {
    ForecastError::Data(format!("Column '{}' has a null at row {}", column_name, row))
}

/// Parse the timestamp layouts we expect in exported market and news data
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }

    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}
