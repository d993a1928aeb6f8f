//! Least-squares fitting
//!
//! Contains:
//! - Simple linear regression of `y` against an arbitrary `x` axis
//! - A dense linear solver for normal equations

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Fitted straight line `y = slope * x + intercept`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineFit {
    /// Change in `y` per unit of `x`
    pub slope: f64,
    /// Value of the line at `x = 0`
    pub intercept: f64,
    /// Coefficient of determination (1.0 for a perfect fit, 0.0 for a flat series)
    pub r_squared: f64,
    /// Population standard deviation of the residuals
    pub residual_std_dev: f64,
}

impl LineFit {
    /// Evaluate the line at `x`
    pub fn value_at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a least-squares line through the points `(xs[i], ys[i])`
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LineFit> {
    if xs.len() != ys.len() {
        return Err(MathError::InvalidInput(format!(
            "x and y lengths differ ({} vs {})",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < 2 {
        return Err(MathError::InsufficientData(format!(
            "Line fit needs at least 2 points, have {}",
            xs.len()
        )));
    }

    let n = xs.len() as f64;
    let x_mean = xs.iter().sum::<f64>() / n;
    let y_mean = ys.iter().sum::<f64>() / n;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        sxy += (x - x_mean) * (y - y_mean);
        sxx += (x - x_mean) * (x - x_mean);
    }

    if sxx.abs() < 1e-12 {
        return Err(MathError::CalculationError(
            "Cannot calculate slope: x values are too similar".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        let residual = y - (slope * x + intercept);
        ss_res += residual * residual;
        ss_tot += (y - y_mean) * (y - y_mean);
    }

    let r_squared = if ss_tot.abs() < 1e-12 {
        // flat series: the fitted line explains everything there is
        if ss_res.abs() < 1e-12 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(LineFit {
        slope,
        intercept,
        r_squared,
        residual_std_dev: (ss_res / n).sqrt(),
    })
}

/// Solve the square system `matrix * x = rhs` by Gaussian elimination with partial pivoting
pub fn solve_linear_system(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();
    if matrix.len() != n || matrix.iter().any(|row| row.len() != n) {
        return Err(MathError::InvalidInput(format!(
            "Expected a {n}x{n} system"
        )));
    }

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);

        if matrix[pivot][col].abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Singular system: columns are linearly dependent".to_string(),
            ));
        }

        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in (col + 1)..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }

    Ok(solution)
}
