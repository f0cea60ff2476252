//! Model training: split, scale, fit, evaluate.

use crate::metrics::EvaluationMetrics;
use crate::regression::LinearModel;
use crate::split::train_test_split;
use auction_core::config::TrainingConfig;
use auction_core::{Error, FeatureVector, Result};
use auction_features::FeatureScaler;
use tracing::info;

/// Everything a training run produces besides the encoders.
#[derive(Debug)]
pub struct TrainOutcome {
    pub model: LinearModel,
    pub scaler: FeatureScaler,
    pub metrics: EvaluationMetrics,
}

/// Fits a linear model with a seeded held-out evaluation.
#[derive(Debug, Clone)]
pub struct ModelTrainer {
    test_fraction: f64,
    seed: u64,
    min_rows: usize,
}

impl Default for ModelTrainer {
    fn default() -> Self {
        Self::new(&TrainingConfig::default())
    }
}

impl ModelTrainer {
    /// Create a trainer from configuration.
    pub fn new(config: &TrainingConfig) -> Self {
        Self {
            test_fraction: config.test_fraction,
            seed: config.seed,
            // A split needs one row per side.
            min_rows: config.min_rows.max(2),
        }
    }

    /// Minimum rows required by [`train`](Self::train).
    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    /// Train on a raw (unscaled) feature matrix and its targets.
    ///
    /// The scaler is fitted on the training partition only; the held-out
    /// partition is transformed with those statistics, as future listings
    /// would be.
    pub fn train(&self, x: &[FeatureVector], y: &[f64]) -> Result<TrainOutcome> {
        if x.len() != y.len() {
            return Err(Error::data(format!(
                "feature rows ({}) and targets ({}) differ in length",
                x.len(),
                y.len()
            )));
        }
        if x.len() < self.min_rows {
            return Err(Error::insufficient_data(format!(
                "{} usable rows, need at least {}",
                x.len(),
                self.min_rows
            )));
        }

        let split = train_test_split(x.len(), self.test_fraction, self.seed)?;
        let x_train: Vec<FeatureVector> = split.train.iter().map(|&i| x[i]).collect();
        let y_train: Vec<f64> = split.train.iter().map(|&i| y[i]).collect();
        let x_test: Vec<FeatureVector> = split.test.iter().map(|&i| x[i]).collect();
        let y_test: Vec<f64> = split.test.iter().map(|&i| y[i]).collect();

        info!(
            train = x_train.len(),
            test = x_test.len(),
            seed = self.seed,
            "Split dataset"
        );

        let scaler = FeatureScaler::fit(&x_train)?;
        let model = LinearModel::fit(&scaler.transform_all(&x_train), &y_train)?;

        let predictions = model.predict_batch(&scaler.transform_all(&x_test))?;
        let metrics = EvaluationMetrics::compute(&y_test, &predictions, x_train.len());

        info!(mse = metrics.mse, r2 = metrics.r2, "Evaluated on held-out partition");
        Ok(TrainOutcome {
            model,
            scaler,
            metrics,
        })
    }
}
