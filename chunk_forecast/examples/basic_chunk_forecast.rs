use chrono::{TimeZone, Utc};
use chunk_forecast::chunking::{chunk_by_key, SplitRule};
use chunk_forecast::metrics::{evaluate, summarize};
use chunk_forecast::models::ExponentialSmoothing;
use chunk_forecast::{synthetic, ChunkedForecastRunner, RunnerConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Chunk Forecast: Basic Example");
    println!("=============================\n");

    // Two hours of minute prices for three tickers
    let start = Utc
        .with_ymd_and_hms(2021, 1, 4, 14, 30, 0)
        .single()
        .ok_or("invalid start time")?;
    let rows = synthetic::minute_prices(&["AAPL", "MSFT", "GOOG"], start, 120, 42)?;
    println!("Generated {} rows\n", rows.len());

    // Hold out the last 10% of every ticker for evaluation
    let chunks = chunk_by_key(&rows, SplitRule::Ratio { evaluation_ratio: 0.1 })?;
    for chunk in &chunks {
        println!(
            "{}: {} training points, {} evaluation points",
            chunk.key(),
            chunk.training().len(),
            chunk.evaluation().len()
        );
    }

    // One fresh model per chunk, 12 minutes ahead
    let config = RunnerConfig::default().with_horizon(12).with_parallel(true);
    let runner = ChunkedForecastRunner::new(ExponentialSmoothing::new(0.3)?, config)?;
    let results = runner.run(&chunks)?;

    println!("\nPer-ticker accuracy:");
    for result in &results {
        match evaluate(result) {
            Some(accuracy) => println!("  {}: {}", result.key(), accuracy),
            None => println!("  {}: no overlapping timestamps", result.key()),
        }
    }

    if let Some(pooled) = summarize(&results) {
        println!("\nPooled: {}", pooled);
    }

    Ok(())
}
