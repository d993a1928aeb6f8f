use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use chunk_forecast::chunking::{chunk_by_key, load_panel_csv, PanelColumns, SplitRule};
use chunk_forecast::metrics::{evaluate, summarize};
use chunk_forecast::result::{results_to_dataframe, write_results_csv};
use chunk_forecast::{synthetic, ChunkedForecastRunner, PipelineConfig};
use std::io::Write;
use tempfile::NamedTempFile;

// Two tickers on a straight line, interleaved and out of order
fn panel_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "ticker,t,c").unwrap();
    for m in (0..12).rev() {
        writeln!(file, "AAPL,2021-01-04 00:{:02}:00,{}", m, (m + 1) as f64).unwrap();
        writeln!(file, "MSFT,2021-01-04 00:{:02}:00,{}", m, 100.0 - m as f64).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_csv_panel_end_to_end() {
    let file = panel_csv();
    let config = PipelineConfig::from_toml_str(
        r#"
        [runner]
        horizon = 2

        [split]
        rule = "holdout"
        evaluation_len = 2
        "#,
    )
    .unwrap();

    let rows = load_panel_csv(file.path(), &config.columns).unwrap();
    assert_eq!(rows.len(), 24);

    let chunks = chunk_by_key(&rows, config.split).unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].key(), "AAPL");
    assert_eq!(chunks[0].training().len(), 10);

    let runner = ChunkedForecastRunner::new(config.model.clone(), config.runner.clone()).unwrap();
    let results = runner.run(&chunks).unwrap();

    let start = Utc.with_ymd_and_hms(2021, 1, 4, 0, 0, 0).unwrap();
    assert_eq!(
        results[0].timestamps(),
        vec![start + Duration::minutes(10), start + Duration::minutes(11)]
    );
    assert_relative_eq!(results[0].predictions()[1], 12.0, epsilon = 1e-9);
    assert_relative_eq!(results[1].predictions()[0], 90.0, epsilon = 1e-9);

    let pooled = summarize(&results).unwrap();
    assert_eq!(pooled.count, 4);
    assert!(pooled.mae < 1e-9);
}

#[test]
fn test_custom_column_names() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "symbol,time,close").unwrap();
    writeln!(file, "X,2021-01-04T00:00:00Z,1.0").unwrap();
    writeln!(file, "X,2021-01-04T00:01:00Z,2.0").unwrap();
    writeln!(file, "X,2021-01-04T00:02:00Z,3.0").unwrap();
    file.flush().unwrap();

    let columns = PanelColumns {
        key: "symbol".to_string(),
        time: "time".to_string(),
        value: "close".to_string(),
    };
    let rows = load_panel_csv(file.path(), &columns).unwrap();

    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].value, 3.0);
    assert!(load_panel_csv(file.path(), &PanelColumns::default()).is_err());
}

#[test]
fn test_synthetic_panel_through_runner() {
    let start = Utc.with_ymd_and_hms(2021, 1, 4, 14, 30, 0).unwrap();
    let rows = synthetic::minute_prices(&["AAPL", "MSFT", "GOOG"], start, 60, 11).unwrap();
    let chunks = chunk_by_key(&rows, SplitRule::Ratio { evaluation_ratio: 0.1 }).unwrap();

    let config = PipelineConfig::default();
    let runner = ChunkedForecastRunner::new(
        config.model,
        config.runner.with_horizon(6).with_parallel(true),
    )
    .unwrap();
    let results = runner.run(&chunks).unwrap();

    assert_eq!(results.len(), 3);
    for result in &results {
        assert_eq!(result.len(), 6);
        let accuracy = evaluate(result).unwrap();
        assert!(accuracy.rmse.is_finite());
    }

    let df = results_to_dataframe(&results).unwrap();
    assert_eq!(df.height(), 18);

    let output = NamedTempFile::new().unwrap();
    write_results_csv(&results, output.as_file()).unwrap();
    let written = std::fs::read_to_string(output.path()).unwrap();
    assert_eq!(written.lines().count(), 19);
}
