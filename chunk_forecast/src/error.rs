//! Error types for the chunk_forecast crate

use forecast_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the chunk_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed chunk or window (ordering, emptiness, overlap)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The forecasting model failed to fit or to predict
    #[error("Fitting error: {0}")]
    Fitting(String),

    /// Error related to data loading or conversion
    #[error("Data error: {0}")]
    Data(String),

    /// Error reading or validating configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single chunk failed; carries its position in the batch
    #[error("chunk {index} ({key}): {source}")]
    Chunk {
        index: usize,
        key: String,
        #[source]
        source: Box<ForecastError>,
    },

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error from JSON or CSV serialization
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ForecastError {
    /// Attach a chunk position and key to an error raised while processing it
    pub fn in_chunk(self, index: usize, key: &str) -> Self {
        ForecastError::Chunk {
            index,
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    /// Index of the chunk that raised this error, if any
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            ForecastError::Chunk { index, .. } => Some(*index),
            _ => None,
        }
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        ForecastError::Fitting(err.to_string())
    }
}

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Serialization(err.to_string())
    }
}
