//! Chunk forecast CLI: fit one model per key of a long-format price panel
//! and score the predictions against the held-out tail of each series.

use anyhow::{bail, Context, Result};
use chrono::{TimeZone, Utc};
use chunk_forecast::chunking::{chunk_by_key, load_panel_csv};
use chunk_forecast::metrics::{evaluate, summarize};
use chunk_forecast::result::write_results_csv;
use chunk_forecast::{synthetic, ChunkedForecastRunner, ForecastResult, Frequency, PipelineConfig};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "chunk_forecast",
    about = "Fit one forecasting model per series chunk and join predictions with ground truth"
)]
struct Cli {
    /// Long-format CSV with key, time and value columns. Synthetic minute
    /// prices are generated when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Pipeline configuration (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the forecast horizon.
    #[arg(long)]
    horizon: Option<usize>,

    /// Override the forecast frequency (e.g. 1min, 5min, 1h).
    #[arg(long)]
    frequency: Option<Frequency>,

    /// Fit chunks in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Report failed chunks instead of aborting the batch.
    #[arg(long, default_value_t = false)]
    isolate_failures: bool,

    /// Keys of the synthetic panel.
    #[arg(long, value_delimiter = ',', default_value = "AAPL,MSFT,GOOG")]
    keys: Vec<String>,

    /// Minutes of synthetic data per key.
    #[arg(long, default_value_t = 120)]
    minutes: usize,

    /// Seed of the synthetic panel.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Write the joined results to this CSV file.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load_from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(horizon) = cli.horizon {
        config.runner.horizon = horizon;
    }
    if let Some(frequency) = cli.frequency {
        config.runner.frequency = frequency;
    }
    config.runner.parallel |= cli.parallel;
    config.runner.isolate_failures |= cli.isolate_failures;
    config.validate()?;

    let rows = match &cli.input {
        Some(path) => load_panel_csv(path, &config.columns)
            .with_context(|| format!("reading panel {}", path.display()))?,
        None => {
            if cli.keys.is_empty() {
                bail!("--keys must name at least one series");
            }
            let keys: Vec<&str> = cli.keys.iter().map(String::as_str).collect();
            let start = Utc
                .with_ymd_and_hms(2021, 1, 4, 14, 30, 0)
                .single()
                .context("invalid synthetic start time")?;
            info!("No --input given, generating {} synthetic minutes per key", cli.minutes);
            synthetic::minute_prices(&keys, start, cli.minutes, cli.seed)?
        }
    };

    let chunks = chunk_by_key(&rows, config.split)?;
    info!("Built {} chunks from {} rows", chunks.len(), rows.len());

    let runner = ChunkedForecastRunner::new(config.model.clone(), config.runner.clone())?;
    let results = if config.runner.isolate_failures {
        let report = runner.run_isolated(&chunks)?;
        for failure in &report.failures {
            println!("FAILED chunk {} ({}): {}", failure.index, failure.key, failure.error);
        }
        report.results
    } else {
        runner.run(&chunks)?
    };

    print_report(&results);

    if let Some(path) = &cli.output {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write_results_csv(&results, BufWriter::new(file))?;
        println!("Results written to {}", path.display());
    }

    Ok(())
}

fn print_report(results: &[ForecastResult]) {
    println!("{:<6} {:<10} {:>6} {:>12} {:>12}", "chunk", "key", "rows", "MAE", "RMSE");
    for result in results {
        match evaluate(result) {
            Some(accuracy) => println!(
                "{:<6} {:<10} {:>6} {:>12.4} {:>12.4}",
                result.chunk_index(),
                result.key(),
                accuracy.count,
                accuracy.mae,
                accuracy.rmse
            ),
            None => println!(
                "{:<6} {:<10} {:>6} {:>12} {:>12}",
                result.chunk_index(),
                result.key(),
                0,
                "-",
                "-"
            ),
        }
    }

    match summarize(results) {
        Some(summary) => print!("\n{}", summary),
        None => println!("\nNo forecast timestamps overlapped the evaluation windows"),
    }
}
