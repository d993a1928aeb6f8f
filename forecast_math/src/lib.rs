//! # Forecast Math
//!
//! Numeric building blocks behind the forecasting models bundled with
//! `chunk_forecast`: least-squares line fits, small dense linear solves,
//! exponential smoothing, trailing means, differencing and autoregressive
//! coefficient estimation.

use thiserror::Error;

pub mod autoregression;
pub mod regression;
pub mod smoothing;

/// Errors that can occur in forecasting calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecasting math operations
pub type Result<T> = std::result::Result<T, MathError>;

pub use autoregression::{difference, fit_autoregression, integrate, ArCoefficients};
pub use regression::{fit_line, solve_linear_system, LineFit};
pub use smoothing::{ExponentialSmoothing, SimpleMovingAverage};
