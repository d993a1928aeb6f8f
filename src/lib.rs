//! # ChunkCast
//!
//! Workspace facade over the chunked forecasting crates:
//!
//! - [`chunk_forecast`]: chunks, models, the batch runner and its output
//! - [`forecast_math`]: the numeric routines the models are fitted with
//!
//! ## Example
//!
//! ```
//! use chunkcast_workspace::chunk_forecast::models::LinearTrend;
//! use chunkcast_workspace::chunk_forecast::{
//!     forecast_chunks, Chunk, EvaluationWindow, Frequency, TimeSeriesWindow,
//! };
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2021, 1, 4, 0, 0, 0).unwrap();
//! let minutes: Vec<_> = (0..10).map(|m| start + Duration::minutes(m)).collect();
//! let training = TimeSeriesWindow::from_parts(minutes, (1..=10).map(f64::from).collect()).unwrap();
//! let evaluation =
//!     EvaluationWindow::from_parts(vec![start + Duration::minutes(10)], vec![11.0]).unwrap();
//! let chunk = Chunk::new("AAPL", training, evaluation).unwrap();
//!
//! let results = forecast_chunks(LinearTrend::new(), &[chunk], 1, Frequency::default()).unwrap();
//! assert!((results[0].rows()[0].predicted - 11.0).abs() < 1e-9);
//! ```

pub use chunk_forecast;
pub use forecast_math;

pub use chunk_forecast::{
    forecast_chunks, Chunk, ChunkedForecastRunner, ForecastError, ForecastModel, ForecastResult,
    Frequency, RunnerConfig,
};
