//! Price prediction for unseen listings.
//!
//! Each call loads the published bundle, so a retrain is picked up by the
//! next request without restarting anything. The service holds no mutable
//! state and is safe to share across threads.

use crate::artifact::{ArtifactBundle, ArtifactStore};
use auction_core::{Config, Error, ListingInput, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

/// A floor-clamped price estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceEstimate {
    /// Estimated final price, never below the starting bid.
    pub price: f64,
    /// Model output before clamping.
    pub raw: f64,
    /// Whether the floor was applied.
    pub clamped: bool,
}

impl PriceEstimate {
    /// Apply the starting-bid floor to a raw model output.
    pub fn floor_at(raw: f64, starting_bid: f64) -> Self {
        let clamped = raw.is_nan() || raw < starting_bid;
        Self {
            price: if clamped { starting_bid } else { raw },
            raw,
            clamped,
        }
    }
}

/// Serves price estimates from the published artifact bundle.
#[derive(Debug, Clone)]
pub struct PredictionService {
    store: ArtifactStore,
}

impl PredictionService {
    /// Create a service reading from `store`.
    pub fn new(store: ArtifactStore) -> Self {
        Self { store }
    }

    /// Create a service from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ArtifactStore::from_config(&config.artifacts))
    }

    /// Estimate the final price of a listing starting now.
    pub fn predict(&self, listing: &ListingInput) -> Result<PriceEstimate> {
        self.predict_at(listing, Utc::now())
    }

    /// Estimate the final price of a listing starting at `now`.
    pub fn predict_at(&self, listing: &ListingInput, now: DateTime<Utc>) -> Result<PriceEstimate> {
        let bundle = self.store.load()?;
        Self::predict_with(&bundle, listing, now)
    }

    /// Estimate with an already-loaded bundle.
    pub fn predict_with(
        bundle: &ArtifactBundle,
        listing: &ListingInput,
        now: DateTime<Utc>,
    ) -> Result<PriceEstimate> {
        listing.validate()?;
        let raw = bundle.raw_predict(listing, now)?;
        let estimate = PriceEstimate::floor_at(raw, listing.starting_bid);
        if !estimate.price.is_finite() {
            return Err(Error::invalid_input(format!(
                "listing with starting bid {} yields a non-finite price",
                listing.starting_bid
            )));
        }

        debug!(
            category = %listing.category,
            condition = %listing.condition,
            raw = estimate.raw,
            price = estimate.price,
            clamped = estimate.clamped,
            "Predicted price"
        );
        Ok(estimate)
    }
}
