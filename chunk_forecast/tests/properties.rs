//! Property tests for the runner's join invariants.
//!
//! 1. A result never has more rows than the horizon or the evaluation window
//! 2. Every joined timestamp is on the forecast grid and in the evaluation window
//! 3. Running the same batch twice gives the same results

use chrono::{DateTime, Duration, TimeZone, Utc};
use chunk_forecast::models::LinearTrend;
use chunk_forecast::{
    Chunk, ChunkedForecastRunner, EvaluationWindow, Frequency, RunnerConfig, TimeSeriesWindow,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn minute(m: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 4, 0, 0, 0).unwrap() + Duration::minutes(m)
}

fn arb_values(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1000.0..1000.0_f64, len)
}

/// Training length, its values, and evaluation minute offsets past the last training minute
fn arb_chunk() -> impl Strategy<Value = (Vec<f64>, BTreeSet<i64>)> {
    (2usize..30).prop_flat_map(|len| {
        (
            arb_values(len),
            prop::collection::btree_set(1i64..60, 0..15),
        )
    })
}

fn build(values: &[f64], offsets: &BTreeSet<i64>) -> Chunk {
    let last = values.len() as i64 - 1;
    let training =
        TimeSeriesWindow::from_parts((0..values.len() as i64).map(minute).collect(), values.to_vec())
            .unwrap();
    let evaluation = EvaluationWindow::from_parts(
        offsets.iter().map(|&o| minute(last + o)).collect(),
        offsets.iter().map(|&o| o as f64).collect(),
    )
    .unwrap();
    Chunk::new("P", training, evaluation).unwrap()
}

proptest! {
    #[test]
    fn joined_rows_are_bounded_and_on_grid(
        (values, offsets) in arb_chunk(),
        horizon in 1usize..12,
        step in 1u32..6,
    ) {
        let chunk = build(&values, &offsets);
        let frequency = Frequency::minutes(step).unwrap();
        let config = RunnerConfig::default()
            .with_horizon(horizon)
            .with_frequency(frequency)
            .with_silence_fitting(false);
        let runner = ChunkedForecastRunner::new(LinearTrend::new(), config).unwrap();

        let results = runner.run(std::slice::from_ref(&chunk)).unwrap();
        prop_assert_eq!(results.len(), 1);
        let result = &results[0];

        prop_assert!(result.len() <= horizon);
        prop_assert!(result.len() <= offsets.len());

        let grid: BTreeSet<DateTime<Utc>> = frequency
            .future_timestamps(chunk.training().last_timestamp(), horizon)
            .unwrap()
            .into_iter()
            .collect();
        let actual: BTreeSet<DateTime<Utc>> =
            chunk.evaluation().observations().iter().map(|o| o.timestamp).collect();
        let expected: Vec<DateTime<Utc>> = grid.intersection(&actual).copied().collect();
        prop_assert_eq!(result.timestamps(), expected);
    }

    #[test]
    fn repeated_runs_match(
        (values, offsets) in arb_chunk(),
        horizon in 1usize..8,
    ) {
        let chunks = vec![build(&values, &offsets), build(&values, &offsets)];
        let config = RunnerConfig::default()
            .with_horizon(horizon)
            .with_silence_fitting(false);
        let runner = ChunkedForecastRunner::new(LinearTrend::new(), config).unwrap();

        let first = runner.run(&chunks).unwrap();
        let second = runner.run(&chunks).unwrap();
        prop_assert_eq!(first, second);
    }
}
