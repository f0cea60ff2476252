//! Error types for the auction price estimator.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the auction price estimator.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (invalid or missing data).
    #[error("Data error: {0}")]
    Data(String),

    /// Training corpus too small after filtering.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Category label never seen during training.
    #[error("Unknown category: {0:?}")]
    UnknownCategory(String),

    /// Condition label never seen during training.
    #[error("Unknown condition: {0:?}")]
    UnknownCondition(String),

    /// No artifact bundle has been published yet.
    #[error("Model not trained: no artifact bundle at {0}")]
    ModelNotTrained(String),

    /// Prediction input rejected before reaching the model.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Artifact storage failure (unreadable, corrupt or unwritable bundle).
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Historical data source error.
    #[error("Database error: {0}")]
    Database(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an insufficient data error.
    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        Error::InsufficientData(msg.into())
    }

    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a persistence error.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Error::Persistence(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Error::Database(msg.into())
    }

    /// Stable machine-readable code, used in structured CLI output.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Data(_) => "data",
            Error::InsufficientData(_) => "insufficient_data",
            Error::UnknownCategory(_) => "unknown_category",
            Error::UnknownCondition(_) => "unknown_condition",
            Error::ModelNotTrained(_) => "model_not_trained",
            Error::InvalidInput(_) => "invalid_input",
            Error::Persistence(_) => "persistence",
            Error::Database(_) => "database",
            Error::Json(_) => "json",
        }
    }
}
