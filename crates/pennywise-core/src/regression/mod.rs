//! Small regressors used by the forecasting models
//!
//! Models are plain serde structs so trained state can be persisted as JSON
//! artifacts and loaded back without retraining.

mod forest;
mod linear;

pub use forest::{RandomForest, RegressionTree};
pub use linear::{simple_slope, LinearRegression};

use crate::error::{Error, Result};

/// Common trait for all tabular regressors
pub trait Regressor {
    /// Fit the model to a feature matrix and targets
    fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> Result<()>;

    /// Predict a single row
    fn predict(&self, row: &[f64]) -> Result<f64>;

    /// Check if the model has been fitted
    fn is_fitted(&self) -> bool;
}

/// Shape checks shared by every `fit`
fn check_training_data(x: &[Vec<f64>], y: &[f64]) -> Result<usize> {
    if x.is_empty() {
        return Err(Error::Model("Cannot fit on zero rows".to_string()));
    }
    if x.len() != y.len() {
        return Err(Error::Model(format!(
            "Feature rows ({}) and targets ({}) differ in length",
            x.len(),
            y.len()
        )));
    }
    let width = x[0].len();
    if x.iter().any(|row| row.len() != width) {
        return Err(Error::Model("Ragged feature matrix".to_string()));
    }
    if x.iter().flatten().chain(y).any(|v| !v.is_finite()) {
        return Err(Error::Model("Training data contains NaN or infinity".to_string()));
    }
    Ok(width)
}

fn check_row(row: &[f64], expected: usize) -> Result<()> {
    if row.len() != expected {
        return Err(Error::Model(format!(
            "Expected {} features, got {}",
            expected,
            row.len()
        )));
    }
    Ok(())
}
