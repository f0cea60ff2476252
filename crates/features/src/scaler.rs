//! Feature standardization.
//!
//! Per-column mean and population standard deviation, computed once on the
//! training partition and reused unchanged at serving time.

use auction_core::{Error, FeatureVector, Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Fitted `(x - mean) / std` transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    /// Per-feature mean.
    pub mean: FeatureVector,
    /// Per-feature standard deviation (never zero).
    pub std: FeatureVector,
}

impl FeatureScaler {
    /// Fit on a feature matrix.
    pub fn fit(rows: &[FeatureVector]) -> Result<Self> {
        if rows.is_empty() {
            return Err(Error::insufficient_data("cannot fit scaler on zero rows"));
        }

        let mut mean = [0.0; FEATURE_COUNT];
        let mut std = [1.0; FEATURE_COUNT];

        for col in 0..FEATURE_COUNT {
            let column: Vec<f64> = rows.iter().map(|row| row[col]).collect();
            mean[col] = column.iter().mean();
            let sd = column.iter().population_std_dev();
            // Constant columns pass through centered but unscaled.
            std[col] = if sd.is_finite() && sd > 0.0 { sd } else { 1.0 };
        }

        Ok(Self { mean, std })
    }

    /// Standardize one row.
    pub fn transform(&self, row: &FeatureVector) -> FeatureVector {
        let mut out = [0.0; FEATURE_COUNT];
        for (i, value) in out.iter_mut().enumerate() {
            *value = (row[i] - self.mean[i]) / self.std[i];
        }
        out
    }

    /// Standardize many rows.
    pub fn transform_all(&self, rows: &[FeatureVector]) -> Vec<FeatureVector> {
        rows.iter().map(|row| self.transform(row)).collect()
    }

    /// All statistics finite and every std positive.
    pub fn is_valid(&self) -> bool {
        self.mean.iter().all(|m| m.is_finite())
            && self.std.iter().all(|s| s.is_finite() && *s > 0.0)
    }
}
