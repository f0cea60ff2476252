//! Held-out evaluation metrics.
//!
//! Diagnostic only: no metric value blocks publishing a model.

use serde::{Deserialize, Serialize};
use smartcore::metrics;

/// Regression quality on the held-out partition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean squared error.
    pub mse: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Coefficient of determination.
    pub r2: f64,
    /// Rows used for fitting.
    pub train_rows: usize,
    /// Rows used for evaluation.
    pub test_rows: usize,
}

impl EvaluationMetrics {
    /// Compute metrics from held-out targets and predictions.
    pub fn compute(actual: &[f64], predicted: &[f64], train_rows: usize) -> Self {
        let mse = mean_squared_error(actual, predicted);
        Self {
            mse,
            rmse: mse.sqrt(),
            r2: r2_score(actual, predicted),
            train_rows,
            test_rows: actual.len(),
        }
    }
}

/// Mean of squared residuals. Zero for empty input.
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    metrics::mean_squared_error(&actual[..n].to_vec(), &predicted[..n].to_vec())
}

/// Coefficient of determination, `1 - SS_res / SS_tot`.
///
/// When the targets are constant, SS_tot is zero: a perfect fit scores 1.0
/// and anything else 0.0, so the result is always finite.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let n = actual.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let (actual, predicted) = (&actual[..n], &predicted[..n]);

    let first = actual[0];
    if actual.iter().all(|&a| a == first) {
        return if actual == predicted { 1.0 } else { 0.0 };
    }
    metrics::r2(&actual.to_vec(), &predicted.to_vec())
}
