//! Core types and configuration for the auction price estimator.
//!
//! This crate provides shared types used across all other crates:
//! - Historical auction documents and derived training examples
//! - The fixed-order numeric feature space
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
