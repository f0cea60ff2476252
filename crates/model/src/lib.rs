//! Model fitting, persistence and serving for the auction price estimator.
//!
//! This crate provides:
//! - Seeded train/test splitting
//! - Least-squares regression on standardized features (smartcore SVD)
//! - Held-out evaluation (MSE, R²)
//! - Atomic persistence of the fitted artifact bundle
//! - The prediction service and the end-to-end training job

pub mod split;
pub mod regression;
pub mod metrics;
pub mod trainer;
pub mod artifact;
pub mod predictor;
pub mod job;

pub use split::{train_test_split, Split};
pub use regression::{LinearModel, MIN_FIT_ROWS};
pub use metrics::EvaluationMetrics;
pub use trainer::{ModelTrainer, TrainOutcome};
pub use artifact::{ArtifactBundle, ArtifactStore, BundleMetadata};
pub use predictor::{PredictionService, PriceEstimate};
pub use job::{TrainingJob, TrainingReport};
