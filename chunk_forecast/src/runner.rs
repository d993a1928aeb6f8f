//! Chunked forecast runner
//!
//! Fits one independent model per chunk, predicts a fixed horizon past each
//! training window and inner-joins the predictions with the chunk's
//! evaluation window. Results always come back in input order.

use crate::config::RunnerConfig;
use crate::data::Chunk;
use crate::error::{ForecastError, Result};
use crate::frequency::Frequency;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::result::ForecastResult;
use crate::silence;
use log::{debug, info, warn};
use rayon::prelude::*;

/// A chunk that could not be forecast
#[derive(Debug)]
pub struct ChunkFailure {
    /// Position of the chunk in the input batch
    pub index: usize,
    pub key: String,
    pub error: ForecastError,
}

/// Outcome of [`ChunkedForecastRunner::run_isolated`]
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Results of the chunks that succeeded, in input order
    pub results: Vec<ForecastResult>,
    /// Failed chunks, in input order
    pub failures: Vec<ChunkFailure>,
}

impl BatchReport {
    /// True when every chunk produced a result
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Indices of the failed chunks
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }
}

/// Batch runner that fits a fresh model to every chunk
#[derive(Debug, Clone)]
pub struct ChunkedForecastRunner<M: ForecastModel> {
    model: M,
    config: RunnerConfig,
}

impl<M: ForecastModel> ChunkedForecastRunner<M> {
    /// Create a runner, validating the configuration up front
    pub fn new(model: M, config: RunnerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { model, config })
    }

    /// Runner with a one-step, one-minute horizon
    pub fn with_defaults(model: M) -> Self {
        Self {
            model,
            config: RunnerConfig::default(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Forecast every chunk, aborting the batch on the first failure.
    ///
    /// The returned error is [`ForecastError::Chunk`] naming the failing
    /// chunk's position and key. In parallel mode every chunk is attempted
    /// and the lowest-index failure is reported.
    pub fn run(&self, chunks: &[Chunk]) -> Result<Vec<ForecastResult>> {
        check_batch(chunks)?;
        info!(
            "Forecasting {} chunks with {} (horizon={}, frequency={})",
            chunks.len(),
            self.model.name(),
            self.config.horizon,
            self.config.frequency
        );

        if self.config.parallel {
            return self
                .run_parallel(chunks)?
                .into_iter()
                .zip(chunks)
                .enumerate()
                .map(|(index, (outcome, chunk))| {
                    outcome.map_err(|e| e.in_chunk(index, chunk.key()))
                })
                .collect();
        }

        // collecting into Result stops at the first failing chunk
        chunks
            .iter()
            .enumerate()
            .map(|(index, chunk)| {
                self.forecast_chunk(index, chunk, self.config.silence_fitting)
                    .map_err(|e| e.in_chunk(index, chunk.key()))
            })
            .collect()
    }

    /// Forecast every chunk, recording failures instead of aborting.
    ///
    /// Only batch-level problems (an empty chunk list, a failure to silence
    /// the output streams in parallel mode) are returned as `Err`.
    pub fn run_isolated(&self, chunks: &[Chunk]) -> Result<BatchReport> {
        check_batch(chunks)?;
        info!(
            "Forecasting {} chunks with {} in isolated mode",
            chunks.len(),
            self.model.name()
        );

        let outcomes: Vec<Result<ForecastResult>> = if self.config.parallel {
            self.run_parallel(chunks)?
        } else {
            chunks
                .iter()
                .enumerate()
                .map(|(index, chunk)| {
                    self.forecast_chunk(index, chunk, self.config.silence_fitting)
                })
                .collect()
        };

        let mut report = BatchReport::default();
        for (index, (outcome, chunk)) in outcomes.into_iter().zip(chunks).enumerate() {
            match outcome {
                Ok(result) => report.results.push(result),
                Err(error) => {
                    warn!("Chunk {} ({}) failed: {}", index, chunk.key(), error);
                    report.failures.push(ChunkFailure {
                        index,
                        key: chunk.key().to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "{} of {} chunks forecast successfully",
            report.results.len(),
            chunks.len()
        );
        Ok(report)
    }

    /// Fit all chunks on the rayon pool. The descriptors are process-global,
    /// so one silencing scope covers the whole batch and every task joins it.
    fn run_parallel(&self, chunks: &[Chunk]) -> Result<Vec<Result<ForecastResult>>> {
        let silence_fit = self.config.silence_fitting;
        let fit_all = || {
            chunks
                .par_iter()
                .enumerate()
                .map(|(index, chunk)| {
                    let _shared = silence_fit.then(silence::share_open_scope);
                    self.forecast_chunk(index, chunk, false)
                })
                .collect::<Vec<_>>()
        };

        if silence_fit {
            Ok(silence::silenced(fit_all)?)
        } else {
            Ok(fit_all())
        }
    }

    fn forecast_chunk(&self, index: usize, chunk: &Chunk, silence_fit: bool) -> Result<ForecastResult> {
        debug!(
            "Fitting {} on chunk {} ({}) with {} observations",
            self.model.name(),
            index,
            chunk.key(),
            chunk.training().len()
        );

        let trained = if silence_fit {
            silence::silenced(|| self.model.train(chunk.training()))?
        } else {
            self.model.train(chunk.training())
        }?;

        let future = self
            .config
            .frequency
            .future_timestamps(chunk.training().last_timestamp(), self.config.horizon)?;
        let predictions = trained.predict(&future)?;
        let result =
            ForecastResult::join(index, chunk.key(), chunk.evaluation(), &future, &predictions)?;

        if result.is_empty() {
            warn!(
                "Chunk {} ({}): evaluation window shares no timestamps with the {}-step horizon",
                index,
                chunk.key(),
                future.len()
            );
        }

        Ok(result)
    }
}

fn check_batch(chunks: &[Chunk]) -> Result<()> {
    if chunks.is_empty() {
        return Err(ForecastError::InvalidInput(
            "At least one chunk is required".to_string(),
        ));
    }
    Ok(())
}

/// Forecast `chunks` with `model`, `horizon` steps of `frequency` each.
///
/// Shorthand for a sequential, silenced, abort-on-failure
/// [`ChunkedForecastRunner`].
pub fn forecast_chunks<M: ForecastModel>(
    model: M,
    chunks: &[Chunk],
    horizon: usize,
    frequency: Frequency,
) -> Result<Vec<ForecastResult>> {
    let config = RunnerConfig {
        horizon,
        frequency,
        ..RunnerConfig::default()
    };
    ChunkedForecastRunner::new(model, config)?.run(chunks)
}
