//! Autoregressive estimation
//!
//! Differencing, AR(p) coefficient estimation by (lightly ridged) least
//! squares, recursive multi-step forecasting and re-integration of
//! differenced forecasts.

use crate::regression::solve_linear_system;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Relative ridge applied to the lag coefficients so that perfectly regular
/// series (constant differences) still yield a solvable system.
const RIDGE: f64 = 1e-8;

/// Difference a series `order` times. Each pass shortens it by one.
pub fn difference(values: &[f64], order: usize) -> Vec<f64> {
    let mut current = values.to_vec();
    for _ in 0..order {
        current = current.windows(2).map(|w| w[1] - w[0]).collect();
    }
    current
}

/// Undo [`difference`] for values forecast past the end of `history`.
///
/// `forecasts` are on the `order`-times differenced scale; the result is on
/// the scale of `history`.
pub fn integrate(forecasts: &[f64], history: &[f64], order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(forecasts.to_vec());
    }
    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "Integrating order {} needs at least {} historical values",
            order, order
        )));
    }

    // last value of every differencing level 0..order
    let mut anchors = Vec::with_capacity(order);
    let mut level = history.to_vec();
    for _ in 0..order {
        anchors.push(level[level.len() - 1]);
        level = difference(&level, 1);
    }

    let mut current = forecasts.to_vec();
    for &anchor in anchors.iter().rev() {
        let mut running = anchor;
        current = current
            .iter()
            .map(|step| {
                running += step;
                running
            })
            .collect();
    }

    Ok(current)
}

/// Fitted AR(p) model `y[t] = intercept + sum(coefficients[i] * y[t-1-i])`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArCoefficients {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl ArCoefficients {
    /// Model order
    pub fn order(&self) -> usize {
        self.coefficients.len()
    }

    /// Forecast `steps` values past the end of `history`, feeding each
    /// forecast back in as the newest lag.
    pub fn forecast(&self, history: &[f64], steps: usize) -> Result<Vec<f64>> {
        let p = self.order();
        if history.len() < p {
            return Err(MathError::InsufficientData(format!(
                "AR({}) forecasting needs {} lagged values, have {}",
                p,
                p,
                history.len()
            )));
        }

        let mut lags = history[history.len() - p..].to_vec();
        let mut forecasts = Vec::with_capacity(steps);

        for _ in 0..steps {
            let next = self.intercept
                + self
                    .coefficients
                    .iter()
                    .enumerate()
                    .map(|(i, c)| c * lags[lags.len() - 1 - i])
                    .sum::<f64>();
            lags.push(next);
            forecasts.push(next);
        }

        Ok(forecasts)
    }
}

/// Estimate an AR(p) model with intercept from `values`.
///
/// Needs at least `2p + 1` values so the regression has more rows than
/// unknowns.
pub fn fit_autoregression(values: &[f64], p: usize) -> Result<ArCoefficients> {
    if p == 0 {
        return Err(MathError::InvalidInput(
            "AR order must be at least 1".to_string(),
        ));
    }
    if values.len() < 2 * p + 1 {
        return Err(MathError::InsufficientData(format!(
            "AR({}) needs at least {} observations, have {}",
            p,
            2 * p + 1,
            values.len()
        )));
    }

    let k = p + 1;
    let mut xtx = vec![vec![0.0; k]; k];
    let mut xty = vec![0.0; k];

    for t in p..values.len() {
        let mut row = Vec::with_capacity(k);
        row.push(1.0);
        row.extend((1..=p).map(|lag| values[t - lag]));

        for i in 0..k {
            xty[i] += row[i] * values[t];
            for j in 0..k {
                xtx[i][j] += row[i] * row[j];
            }
        }
    }

    let scale = (1..k).map(|i| xtx[i][i]).sum::<f64>() / p as f64;
    let ridge = RIDGE * scale.max(1.0);
    for (i, row) in xtx.iter_mut().enumerate().skip(1) {
        row[i] += ridge;
    }

    let solution = solve_linear_system(xtx, xty)?;

    Ok(ArCoefficients {
        intercept: solution[0],
        coefficients: solution[1..].to_vec(),
    })
}
