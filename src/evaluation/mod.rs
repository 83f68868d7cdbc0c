//! Regression metrics and report rendering

pub mod report;

pub use report::render_report;

use crate::error::{EtaError, Result};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Regression evaluation metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Coefficient of determination
    pub r2: f64,
}

/// Compute RMSE, MAE, and R² between ground truth and predictions.
///
/// The arrays must be index-aligned and equally long; a mismatch is an
/// upstream contract violation and fatal.
pub fn evaluate(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<RegressionMetrics> {
    if y_true.len() != y_pred.len() {
        return Err(EtaError::AlignmentError(format!(
            "ground truth has {} values, predictions have {}",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(EtaError::ValidationError(
            "cannot evaluate empty prediction arrays".to_string(),
        ));
    }

    let n = y_true.len() as f64;
    let errors: Vec<f64> = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| t - p)
        .collect();

    let mse: f64 = errors.iter().map(|e| e * e).sum::<f64>() / n;
    let mae: f64 = errors.iter().map(|e| e.abs()).sum::<f64>() / n;

    let y_mean: f64 = y_true.iter().sum::<f64>() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = errors.iter().map(|e| e.powi(2)).sum();
    let r2 = if ss_tot > 0.0 {
        1.0 - ss_res / ss_tot
    } else {
        0.0
    };

    Ok(RegressionMetrics {
        rmse: mse.sqrt(),
        mae,
        r2,
    })
}
