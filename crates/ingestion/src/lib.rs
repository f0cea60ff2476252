//! Historical data ingestion for the auction price estimator.
//!
//! This crate handles:
//! - Fetching eligible completed auctions from a document store
//! - Deriving training examples from raw auction documents
//! - Tracking why records were excluded

pub mod source;
pub mod preprocess;

pub use source::{open_source, AuctionSource, JsonExportSource, MemorySource, SqliteAuctionSource};
pub use preprocess::{ExampleBuilder, ExclusionReason, PreprocessStats};
