//! Ordinary least-squares linear regression over standardized features.
//!
//! Fitting is delegated to smartcore's SVD solver, which leaves columns
//! carrying no independent information (a constant year, say) at weight
//! zero instead of failing the fit.

use auction_core::{Error, FeatureVector, Result, FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::linear_regression::{
    LinearRegression, LinearRegressionParameters, LinearRegressionSolverName,
};
use std::fmt;
use tracing::debug;

/// Rows needed for a determined fit: one per feature plus the intercept.
pub const MIN_FIT_ROWS: usize = FEATURE_COUNT + 1;

type Regressor = LinearRegression<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Fitted linear model.
#[derive(Serialize, Deserialize)]
pub struct LinearModel {
    inner: Regressor,
}

impl LinearModel {
    /// Fit by least squares.
    pub fn fit(x: &[FeatureVector], y: &[f64]) -> Result<Self> {
        if x.len() < MIN_FIT_ROWS {
            return Err(Error::insufficient_data(format!(
                "{} training rows, need at least {} to fit {} features and an intercept",
                x.len(),
                MIN_FIT_ROWS,
                FEATURE_COUNT
            )));
        }
        if x.len() != y.len() {
            return Err(Error::data(format!(
                "feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        if y.iter().any(|v| !v.is_finite()) || x.iter().flatten().any(|v| !v.is_finite()) {
            return Err(Error::data("non-finite value in training data"));
        }

        let matrix = to_matrix(x)?;
        let params =
            LinearRegressionParameters::default().with_solver(LinearRegressionSolverName::SVD);
        let inner = LinearRegression::fit(&matrix, &y.to_vec(), params)
            .map_err(|e| Error::data(format!("regression fit failed: {}", e)))?;

        let model = Self { inner };
        debug!(bias = model.bias(), weights = ?model.weights(), "Fitted linear regression");
        Ok(model)
    }

    /// Predict for one standardized row.
    pub fn predict(&self, row: &FeatureVector) -> Result<f64> {
        self.predict_batch(std::slice::from_ref(row))?
            .first()
            .copied()
            .ok_or_else(|| Error::data("regression returned no prediction"))
    }

    /// Predict for many standardized rows.
    pub fn predict_batch(&self, rows: &[FeatureVector]) -> Result<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        self.inner
            .predict(&to_matrix(rows)?)
            .map_err(|e| Error::data(format!("regression predict failed: {}", e)))
    }

    /// Per-feature weights, in feature order.
    pub fn weights(&self) -> Vec<f64> {
        self.inner.coefficients().iterator(0).copied().collect()
    }

    /// Intercept.
    pub fn bias(&self) -> f64 {
        *self.inner.intercept()
    }

    /// One weight per feature and all parameters finite.
    pub fn is_valid(&self) -> bool {
        let weights = self.weights();
        weights.len() == FEATURE_COUNT
            && weights.iter().all(|w| w.is_finite())
            && self.bias().is_finite()
    }
}

impl PartialEq for LinearModel {
    fn eq(&self, other: &Self) -> bool {
        self.bias() == other.bias() && self.weights() == other.weights()
    }
}

impl fmt::Debug for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearModel")
            .field("weights", &self.weights())
            .field("bias", &self.bias())
            .finish()
    }
}

fn to_matrix(rows: &[FeatureVector]) -> Result<DenseMatrix<f64>> {
    let rows: Vec<Vec<f64>> = rows.iter().map(|row| row.to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
        .map_err(|e| Error::data(format!("cannot build feature matrix: {}", e)))
}

#[cfg(test)]
impl LinearModel {
    /// Fit a model whose exact parameters are `weights` and `bias`.
    pub(crate) fn exact(weights: FeatureVector, bias: f64) -> Self {
        // Origin, each unit vector, then a few mixed rows: full column rank.
        let mut x: Vec<FeatureVector> = vec![[0.0; FEATURE_COUNT]];
        for j in 0..FEATURE_COUNT {
            let mut row = [0.0; FEATURE_COUNT];
            row[j] = 1.0;
            x.push(row);
        }
        x.push([1.0, -1.0, 0.5, 2.0, 0.0, -0.5, 1.5]);
        x.push([-2.0, 0.5, 1.0, 0.0, 1.0, 2.0, -1.0]);
        let y: Vec<f64> = x
            .iter()
            .map(|row| bias + row.iter().zip(&weights).map(|(a, w)| a * w).sum::<f64>())
            .collect();
        Self::fit(&x, &y).unwrap()
    }

    /// Fit a model that predicts `value` everywhere.
    pub(crate) fn constant(value: f64) -> Self {
        Self::exact([0.0; FEATURE_COUNT], value)
    }
}
