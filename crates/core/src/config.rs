//! Configuration structures for the auction price estimator.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration, passed explicitly to the training job and the
/// prediction service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Historical data source.
    pub source: SourceConfig,
    /// Artifact storage.
    pub artifacts: ArtifactConfig,
    /// Model training.
    pub training: TrainingConfig,
}

impl Config {
    /// Load configuration from a JSON file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(format!("cannot read {}: {}", path.display(), e))
                })?;
                serde_json::from_str::<Config>(&text).map_err(|e| {
                    Error::config(format!("cannot parse {}: {}", path.display(), e))
                })?
            }
            None => Config::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.artifacts.validate()?;
        self.training.validate()
    }
}

/// Kind of historical data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Document-store export file (JSON array or one document per line).
    JsonExport,
    /// SQLite table of JSON documents.
    Sqlite,
}

/// Historical data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Backend kind.
    pub kind: SourceKind,
    /// Export file or database path.
    pub path: PathBuf,
    /// Table holding auction documents (sqlite only).
    pub table: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::JsonExport,
            path: PathBuf::from("data/auctions.json"),
            table: "auctions".to_string(),
        }
    }
}

impl SourceConfig {
    fn validate(&self) -> Result<()> {
        if self.path.as_os_str().is_empty() {
            return Err(Error::config("source.path must not be empty"));
        }
        let mut chars = self.table.chars();
        let valid_identifier = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_')
                    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            None => false,
        };
        if !valid_identifier {
            return Err(Error::config(format!(
                "source.table {:?} is not a valid table name",
                self.table
            )));
        }
        Ok(())
    }
}

/// Artifact storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Directory holding the published bundle.
    pub dir: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
        }
    }
}

impl ArtifactConfig {
    fn validate(&self) -> Result<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(Error::config("artifacts.dir must not be empty"));
        }
        Ok(())
    }
}

/// Model training configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the train/test shuffle.
    pub seed: u64,
    /// Minimum usable rows required to train. The fit itself also needs
    /// one training row per feature plus the intercept.
    pub min_rows: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            min_rows: 10,
        }
    }
}

impl TrainingConfig {
    fn validate(&self) -> Result<()> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(Error::config(format!(
                "training.test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.min_rows < 2 {
            return Err(Error::config(format!(
                "training.min_rows must be at least 2, got {}",
                self.min_rows
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.training.test_fraction, 0.2);
        assert_eq!(config.training.seed, 42);
        assert_eq!(config.training.min_rows, 10);
        assert_eq!(config.source.kind, SourceKind::JsonExport);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"source": {{"kind": "sqlite", "path": "auctions.db"}}, "training": {{"seed": 7}}}}"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.source.kind, SourceKind::Sqlite);
        assert_eq!(config.source.table, "auctions");
        assert_eq!(config.training.seed, 7);
        assert_eq!(config.training.test_fraction, 0.2);
    }

    #[test]
    fn test_load_without_path_uses_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.artifacts.dir, PathBuf::from("artifacts"));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = Config::default();
        config.training.test_fraction = 1.0;
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.training.min_rows = 1;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.table = "auctions; DROP TABLE x".to_string();
        assert!(config.validate().is_err());
    }
}
