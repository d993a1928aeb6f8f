//! # Chunk Forecast
//!
//! Fit one independent forecasting model per time-series chunk, predict a
//! fixed horizon past each training window and join the predictions with the
//! chunk's ground truth.
//!
//! ## Features
//!
//! - Validated training and evaluation windows, grouped into chunks
//! - Pluggable models through the [`ForecastModel`] trait (linear trend,
//!   exponential smoothing, moving average, autoregressive)
//! - Sequential or rayon-parallel batches with results in input order
//! - Output of fitting routines silenced at the file-descriptor level
//! - Abort-on-first-failure runs, or isolated runs that report every failure
//! - Chunk assembly from long-format CSV panels and accuracy metrics
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chunk_forecast::chunking::{chunk_by_key, load_panel_csv, PanelColumns, SplitRule};
//! use chunk_forecast::models::LinearTrend;
//! use chunk_forecast::{ChunkedForecastRunner, Frequency, RunnerConfig};
//!
//! # fn main() -> chunk_forecast::Result<()> {
//! let rows = load_panel_csv("prices.csv", &PanelColumns::default())?;
//! let chunks = chunk_by_key(&rows, SplitRule::Holdout { evaluation_len: 5 })?;
//!
//! let config = RunnerConfig::default()
//!     .with_horizon(5)
//!     .with_frequency(Frequency::minutes(1)?);
//! let runner = ChunkedForecastRunner::new(LinearTrend::new(), config)?;
//!
//! for result in runner.run(&chunks)? {
//!     println!("{}: {} joined rows", result.key(), result.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunking;
pub mod config;
pub mod data;
pub mod error;
pub mod frequency;
pub mod metrics;
pub mod models;
pub mod result;
pub mod runner;
pub mod silence;
pub mod synthetic;

// Re-export commonly used types
pub use crate::config::{PipelineConfig, RunnerConfig};
pub use crate::data::{Chunk, EvaluationWindow, Observation, TimeSeriesWindow};
pub use crate::error::{ForecastError, Result};
pub use crate::frequency::Frequency;
pub use crate::models::{ForecastModel, ModelSpec, TrainedForecastModel};
pub use crate::result::{ForecastResult, ForecastRow};
pub use crate::runner::{forecast_chunks, BatchReport, ChunkFailure, ChunkedForecastRunner};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
