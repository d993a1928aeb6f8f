//! Synthetic minute prices for demos and tests

use crate::chunking::PanelRow;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

const START_PRICE: f64 = 100.0;
const MINUTE_VOLATILITY: f64 = 0.001;

/// Largest panel `minute_prices` will generate
pub const MAX_ROWS: usize = 50_000_000;

/// Random-walk minute closes for every key, starting at 100.0.
///
/// Rows come out in long format, minute by minute with one row per key each
/// minute. The same `seed` always yields the same prices; each key draws from
/// its own stream so adding a key does not move the others.
pub fn minute_prices(
    keys: &[&str],
    start: DateTime<Utc>,
    minutes: usize,
    seed: u64,
) -> Result<Vec<PanelRow>> {
    if keys.is_empty() {
        return Ok(Vec::new());
    }
    let total = keys
        .len()
        .checked_mul(minutes)
        .filter(|&total| total <= MAX_ROWS)
        .ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "{} keys x {} minutes exceeds the {} row limit",
                keys.len(),
                minutes,
                MAX_ROWS
            ))
        })?;
    let returns = Normal::new(0.0, MINUTE_VOLATILITY)
        .map_err(|e| ForecastError::InvalidParameter(format!("Invalid volatility: {}", e)))?;

    let mut rngs: Vec<StdRng> = (0..keys.len() as u64)
        .map(|i| StdRng::seed_from_u64(seed.wrapping_add(i)))
        .collect();
    let mut prices = vec![START_PRICE; keys.len()];
    let mut rows = Vec::with_capacity(total);

    for minute in 0..minutes {
        let timestamp = start
            .checked_add_signed(Duration::minutes(minute as i64))
            .ok_or_else(|| {
                ForecastError::InvalidParameter(format!("{} minutes after {} overflow", minute, start))
            })?;
        for (i, key) in keys.iter().enumerate() {
            if minute > 0 {
                prices[i] *= 1.0 + returns.sample(&mut rngs[i]);
            }
            rows.push(PanelRow {
                key: key.to_string(),
                timestamp,
                value: prices[i],
            });
        }
    }

    Ok(rows)
}
