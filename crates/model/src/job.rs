//! End-to-end training job.
//!
//! fetch eligible records -> derive examples -> fit encoders -> split, scale,
//! fit, evaluate -> publish bundle. Any failure before publishing leaves the
//! previously published bundle untouched.

use crate::artifact::{ArtifactBundle, ArtifactStore, BundleMetadata};
use crate::metrics::EvaluationMetrics;
use crate::trainer::ModelTrainer;
use auction_core::{Config, Error, Result};
use auction_features::FeatureTransformer;
use auction_ingestion::{AuctionSource, ExampleBuilder, PreprocessStats};
use std::path::PathBuf;
use tracing::info;

/// Summary of a successful training run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Eligible records returned by the source.
    pub fetched: usize,
    /// Preprocessing outcome.
    pub preprocess: PreprocessStats,
    /// Held-out evaluation.
    pub metrics: EvaluationMetrics,
    /// Where the bundle was published.
    pub bundle_path: PathBuf,
}

/// Trains and publishes a price model from a historical data source.
pub struct TrainingJob<S: AuctionSource> {
    source: S,
    store: ArtifactStore,
    trainer: ModelTrainer,
}

impl<S: AuctionSource> TrainingJob<S> {
    /// Create a job from configuration and a data source.
    pub fn new(config: &Config, source: S) -> Self {
        Self::with_parts(
            source,
            ArtifactStore::from_config(&config.artifacts),
            ModelTrainer::new(&config.training),
        )
    }

    /// Create a job from explicit parts.
    pub fn with_parts(source: S, store: ArtifactStore, trainer: ModelTrainer) -> Self {
        Self {
            source,
            store,
            trainer,
        }
    }

    /// Run the job to completion.
    pub fn run(&self) -> Result<TrainingReport> {
        info!(source = %self.source.describe(), "Fetching eligible auctions");
        let records = self.source.fetch_eligible()?;
        let fetched = records.len();
        if fetched == 0 {
            return Err(Error::insufficient_data("no eligible auction records found"));
        }
        info!(records = fetched, "Fetched auction records");

        let mut builder = ExampleBuilder::new();
        let examples = builder.build(&records);
        let preprocess = builder.stats().clone();
        if examples.len() < self.trainer.min_rows() {
            return Err(Error::insufficient_data(format!(
                "{} usable examples after preprocessing ({} excluded), need at least {}",
                examples.len(),
                preprocess.excluded(),
                self.trainer.min_rows()
            )));
        }

        let (features, x, y) = FeatureTransformer::fit(&examples)?;
        info!(
            categories = ?features.category_encoder.labels().collect::<Vec<_>>(),
            conditions = ?features.condition_encoder.labels().collect::<Vec<_>>(),
            "Fitted label encoders"
        );
        let outcome = self.trainer.train(&x, &y)?;

        let bundle = ArtifactBundle::new(
            outcome.model,
            outcome.scaler,
            features,
            BundleMetadata::new(outcome.metrics.clone()),
        );
        let bundle_path = self.store.save(&bundle)?;

        Ok(TrainingReport {
            fetched,
            preprocess,
            metrics: outcome.metrics,
            bundle_path,
        })
    }
}
