//! Artifact bundle persistence.
//!
//! The model, scaler and both encoders are written as one JSON container.
//! Saving goes through a temp file in the target directory followed by an
//! atomic rename, so a concurrent loader sees either the previous bundle or
//! the new one, never a mix.

use crate::metrics::EvaluationMetrics;
use crate::regression::LinearModel;
use auction_core::config::ArtifactConfig;
use auction_core::{Error, ListingInput, Result, FEATURE_NAMES};
use auction_features::{FeatureScaler, FeatureTransformer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Current on-disk bundle layout.
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// File name of the published bundle inside the artifact directory.
pub const BUNDLE_FILE_NAME: &str = "price_model_bundle.json";

/// Provenance of a bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BundleMetadata {
    /// When training finished.
    pub trained_at: DateTime<Utc>,
    /// Feature names in model column order.
    pub feature_names: Vec<String>,
    /// Held-out evaluation of this model.
    pub metrics: EvaluationMetrics,
}

impl BundleMetadata {
    /// Metadata for a bundle trained now.
    pub fn new(metrics: EvaluationMetrics) -> Self {
        Self {
            trained_at: Utc::now(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            metrics,
        }
    }
}

/// Model plus all preprocessing state from a single training run.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub format_version: u32,
    pub model: LinearModel,
    pub scaler: FeatureScaler,
    /// Category and condition encoders, stored as top-level members.
    #[serde(flatten)]
    pub features: FeatureTransformer,
    pub metadata: BundleMetadata,
}

impl ArtifactBundle {
    /// Assemble a bundle from the outputs of one training run.
    pub fn new(
        model: LinearModel,
        scaler: FeatureScaler,
        features: FeatureTransformer,
        metadata: BundleMetadata,
    ) -> Self {
        Self {
            format_version: BUNDLE_FORMAT_VERSION,
            model,
            scaler,
            features,
            metadata,
        }
    }

    /// Unclamped model output for a listing priced at `now`.
    pub fn raw_predict(&self, listing: &ListingInput, now: DateTime<Utc>) -> Result<f64> {
        let row = self.features.transform_listing(listing, now)?;
        self.model.predict(&self.scaler.transform(&row))
    }

    /// Reject bundles that are internally inconsistent.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != BUNDLE_FORMAT_VERSION {
            return Err(Error::persistence(format!(
                "unsupported bundle format version {} (expected {})",
                self.format_version, BUNDLE_FORMAT_VERSION
            )));
        }
        if !self.features.is_consistent() {
            return Err(Error::persistence("bundle encoders are empty, swapped or non-dense"));
        }
        if !self.model.is_valid() {
            return Err(Error::persistence("bundle model has the wrong shape or non-finite parameters"));
        }
        if !self.scaler.is_valid() {
            return Err(Error::persistence("bundle scaler has invalid statistics"));
        }
        if self.metadata.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(Error::persistence(format!(
                "bundle feature order {:?} does not match {:?}",
                self.metadata.feature_names, FEATURE_NAMES
            )));
        }
        Ok(())
    }
}

/// Single-writer, many-reader store for the published bundle.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Create a store rooted at `dir`.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Create a store from configuration.
    pub fn from_config(config: &ArtifactConfig) -> Self {
        Self::new(&config.dir)
    }

    /// Path of the published bundle.
    pub fn bundle_path(&self) -> PathBuf {
        self.dir.join(BUNDLE_FILE_NAME)
    }

    /// Whether a bundle has been published.
    pub fn exists(&self) -> bool {
        self.bundle_path().is_file()
    }

    /// Publish a bundle, replacing any previous one.
    pub fn save(&self, bundle: &ArtifactBundle) -> Result<PathBuf> {
        bundle.validate()?;

        std::fs::create_dir_all(&self.dir).map_err(|e| {
            Error::persistence(format!("cannot create {}: {}", self.dir.display(), e))
        })?;

        let path = self.bundle_path();
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir).map_err(|e| {
            Error::persistence(format!("cannot create temp file in {}: {}", self.dir.display(), e))
        })?;

        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, bundle)
                .map_err(|e| Error::persistence(format!("cannot serialize bundle: {}", e)))?;
            writer
                .flush()
                .map_err(|e| Error::persistence(format!("cannot write bundle: {}", e)))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| Error::persistence(format!("cannot sync bundle: {}", e)))?;

        debug!(tmp = %tmp.path().display(), "Wrote bundle to temp file");
        tmp.persist(&path).map_err(|e| {
            Error::persistence(format!("cannot publish {}: {}", path.display(), e.error))
        })?;

        info!(path = %path.display(), "Published artifact bundle");
        Ok(path)
    }

    /// Load the published bundle.
    pub fn load(&self) -> Result<ArtifactBundle> {
        let path = self.bundle_path();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ModelNotTrained(path.display().to_string()));
            }
            Err(e) => {
                return Err(Error::persistence(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let bundle: ArtifactBundle = serde_json::from_slice(&bytes).map_err(|e| {
            Error::persistence(format!("corrupt bundle {}: {}", path.display(), e))
        })?;
        bundle.validate()?;

        debug!(path = %path.display(), trained_at = %bundle.metadata.trained_at, "Loaded artifact bundle");
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auction_core::TrainingExample;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn make_bundle() -> ArtifactBundle {
        make_bundle_with_bias(80.0)
    }

    fn make_bundle_with_bias(bias: f64) -> ArtifactBundle {
        let examples: Vec<TrainingExample> = ["electronics", "collectibles"]
            .into_iter()
            .flat_map(|category| {
                ["new", "used"].into_iter().map(move |condition| TrainingExample {
                    starting_bid: 10.0,
                    category: category.to_string(),
                    condition: condition.to_string(),
                    duration_days: 3,
                    year: 2024,
                    month: 6,
                    watchers: 1,
                    target_price: 15.0,
                })
            })
            .collect();
        let (features, rows, _) = FeatureTransformer::fit(&examples).unwrap();
        let scaler = FeatureScaler::fit(&rows).unwrap();
        let model = LinearModel::exact([2.0, 0.5, 0.0, 0.1, 1.0, -3.0, 4.0], bias);
        ArtifactBundle::new(model, scaler, features, BundleMetadata::new(EvaluationMetrics::default()))
    }

    fn listing() -> ListingInput {
        ListingInput {
            starting_bid: 100.0,
            category: "electronics".to_string(),
            condition: "new".to_string(),
            duration_days: 7,
            watchers: 5,
        }
    }

    #[test]
    fn test_load_before_save_is_not_trained() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        assert!(!store.exists());
        assert!(matches!(store.load(), Err(Error::ModelNotTrained(_))));
    }

    #[test]
    fn test_round_trip_predicts_identically() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested"));
        let bundle = make_bundle();

        let path = store.save(&bundle).unwrap();
        assert_eq!(path, store.bundle_path());
        let loaded = store.load().unwrap();

        assert_eq!(loaded, bundle);
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap();
        assert_eq!(
            loaded.raw_predict(&listing(), now).unwrap(),
            bundle.raw_predict(&listing(), now).unwrap()
        );
    }

    #[test]
    fn test_container_has_four_named_members() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&make_bundle()).unwrap();

        let value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.bundle_path()).unwrap()).unwrap();
        for key in ["model", "scaler", "category_encoder", "condition_encoder"] {
            assert!(value.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_save_replaces_wholesale_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        store.save(&make_bundle()).unwrap();
        let second = make_bundle_with_bias(1.0);
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), second);
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_corrupt_bundle_is_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        std::fs::write(store.bundle_path(), b"{\"model\": ").unwrap();

        assert!(matches!(store.load(), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_swapped_encoders_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let mut bundle = make_bundle();
        std::mem::swap(
            &mut bundle.features.category_encoder,
            &mut bundle.features.condition_encoder,
        );

        assert!(matches!(store.save(&bundle), Err(Error::Persistence(_))));
        assert!(!store.exists());
    }

    #[test]
    fn test_future_format_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        store.save(&make_bundle()).unwrap();

        let mut value: serde_json::Value =
            serde_json::from_slice(&std::fs::read(store.bundle_path()).unwrap()).unwrap();
        value["format_version"] = serde_json::json!(99);
        std::fs::write(store.bundle_path(), value.to_string()).unwrap();

        assert!(matches!(store.load(), Err(Error::Persistence(_))));
    }

    #[test]
    fn test_concurrent_loads_never_see_partial_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        let first = make_bundle_with_bias(10.0);
        let second = make_bundle_with_bias(20.0);
        store.save(&first).unwrap();

        let saving = AtomicBool::new(true);
        let loads = std::thread::scope(|scope| {
            let reader = scope.spawn(|| {
                let mut loads = 0usize;
                loop {
                    let loaded = store.load().unwrap();
                    assert!(loaded == first || loaded == second);
                    loads += 1;
                    if !saving.load(Ordering::Acquire) {
                        return loads;
                    }
                }
            });

            for i in 0..200 {
                let bundle = if i % 2 == 0 { &second } else { &first };
                store.save(bundle).unwrap();
            }
            saving.store(false, Ordering::Release);
            reader.join().unwrap()
        });

        assert!(loads > 0);
        assert_eq!(store.load().unwrap(), first);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
