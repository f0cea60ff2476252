//! Feature computation for the auction price estimator.
//!
//! This crate handles:
//! - Categorical label encoding (category, condition)
//! - Feature standardization with statistics frozen at training time
//! - Mapping raw records and new listings into the fixed feature space

pub mod encoder;
pub mod scaler;
pub mod transformer;

pub use encoder::{CategoricalEncoder, CategoricalField};
pub use scaler::FeatureScaler;
pub use transformer::FeatureTransformer;
