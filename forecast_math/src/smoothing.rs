//! Smoothing primitives
//!
//! Contains incremental implementations of:
//! - Simple Exponential Smoothing
//! - Simple Moving Average over a trailing window

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple exponential smoothing, updated one observation at a time
#[derive(Debug, Clone)]
pub struct ExponentialSmoothing {
    alpha: f64,
    level: Option<f64>,
}

impl ExponentialSmoothing {
    /// Create a new smoother. `alpha` must lie strictly between 0 and 1.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(MathError::InvalidInput(
                "Alpha must be between 0 and 1".to_string(),
            ));
        }

        Ok(Self { alpha, level: None })
    }

    /// Fold one observation into the level
    pub fn update(&mut self, value: f64) {
        self.level = Some(match self.level {
            // the first observation seeds the level
            None => value,
            Some(level) => self.alpha * value + (1.0 - self.alpha) * level,
        });
    }

    /// Current smoothed level
    pub fn level(&self) -> Result<f64> {
        self.level.ok_or_else(|| {
            MathError::InsufficientData("No observations have been smoothed yet".to_string())
        })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

/// Simple Moving Average over the most recent `period` values
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a value, evicting the oldest one once the window is full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Mean of the window. Fails until `period` values have been seen.
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exponential_smoothing() {
        let mut es = ExponentialSmoothing::new(0.3).unwrap();
        assert!(es.level().is_err());

        es.update(10.0);
        assert_relative_eq!(es.level().unwrap(), 10.0);

        // 0.3 * 20 + 0.7 * 10
        es.update(20.0);
        assert_relative_eq!(es.level().unwrap(), 13.0, epsilon = 1e-12);
    }

    #[test]
    fn test_exponential_smoothing_alpha_bounds() {
        assert!(ExponentialSmoothing::new(0.0).is_err());
        assert!(ExponentialSmoothing::new(1.0).is_err());
        assert!(ExponentialSmoothing::new(f64::NAN).is_err());
    }

    #[test]
    fn test_simple_moving_average() {
        let mut sma = SimpleMovingAverage::new(3).unwrap();
        sma.update(1.0);
        sma.update(2.0);
        assert!(sma.value().is_err());

        sma.update(3.0);
        assert_relative_eq!(sma.value().unwrap(), 2.0);

        sma.update(10.0);
        assert_relative_eq!(sma.value().unwrap(), 5.0);
        assert_eq!(sma.period(), 3);
    }

    #[test]
    fn test_simple_moving_average_zero_period() {
        assert!(SimpleMovingAverage::new(0).is_err());
    }
}
