//! Ordinary least squares

use serde::{Deserialize, Serialize};

use super::{check_row, check_training_data, Regressor};
use crate::error::{Error, Result};

/// Pivots smaller than this are treated as a dependent column
const PIVOT_EPSILON: f64 = 1e-9;

/// Linear regression with intercept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    fitted: bool,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fitted model with known parameters
    pub fn with_coefficients(intercept: f64, coefficients: Vec<f64>) -> Self {
        Self {
            intercept,
            coefficients,
            fitted: true,
        }
    }
}

impl Regressor for LinearRegression {
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()> {
        let width = check_training_data(x, y)?;
        let n = width + 1;

        // Normal equations (X'X) b = X'y over [1, x0, x1, ...]
        let mut xtx = vec![vec![0.0; n]; n];
        let mut xty = vec![0.0; n];
        for (row, &target) in x.iter().zip(y) {
            let augmented: Vec<f64> = std::iter::once(1.0).chain(row.iter().copied()).collect();
            for i in 0..n {
                xty[i] += augmented[i] * target;
                for j in 0..n {
                    xtx[i][j] += augmented[i] * augmented[j];
                }
            }
        }

        let beta = solve(xtx, xty);
        self.intercept = beta[0];
        self.coefficients = beta[1..].to_vec();
        self.fitted = true;
        Ok(())
    }

    fn predict(&self, row: &[f64]) -> Result<f64> {
        if !self.fitted {
            return Err(Error::Model("Linear model is not fitted".to_string()));
        }
        check_row(row, self.coefficients.len())?;
        Ok(self.intercept
            + self
                .coefficients
                .iter()
                .zip(row)
                .map(|(c, v)| c * v)
                .sum::<f64>())
    }

    fn is_fitted(&self) -> bool {
        self.fitted
    }
}

/// Gaussian elimination with partial pivoting
///
/// Columns without a usable pivot are left at zero, so rank-deficient systems
/// still produce a (minimal) solution instead of failing.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Vec<f64> {
    let n = b.len();
    let scale = a
        .iter()
        .flatten()
        .fold(0.0_f64, |m, v| m.max(v.abs()))
        .max(1.0);
    let mut pivot_cols: Vec<(usize, usize)> = Vec::new();
    let mut row = 0;

    for col in 0..n {
        if row == n {
            break;
        }
        let best = (row..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(row);
        if a[best][col].abs() <= PIVOT_EPSILON * scale {
            continue;
        }
        a.swap(row, best);
        b.swap(row, best);

        for i in (row + 1)..n {
            let factor = a[i][col] / a[row][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                a[i][k] -= factor * a[row][k];
            }
            b[i] -= factor * b[row];
        }
        pivot_cols.push((row, col));
        row += 1;
    }

    let mut solution = vec![0.0; n];
    for &(r, c) in pivot_cols.iter().rev() {
        let tail: f64 = ((c + 1)..n).map(|k| a[r][k] * solution[k]).sum();
        solution[c] = (b[r] - tail) / a[r][c];
    }
    solution
}

/// Least-squares slope of `ys` against the index 0..n
///
/// Returns 0 for fewer than two points.
pub fn simple_slope(ys: &[f64]) -> f64 {
    let n = ys.len();
    if n < 2 {
        return 0.0;
    }
    let mean_x = (n - 1) as f64 / 2.0;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (y - mean_y);
        den += dx * dx;
    }
    num / den
}
