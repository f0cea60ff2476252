//! Mapping of auctions and listings into the fixed feature space.
//!
//! Training rows and serving requests go through the same column assembly,
//! so the positional weights of the model always line up.

use crate::encoder::{CategoricalEncoder, CategoricalField};
use auction_core::{
    year_month, Error, FeatureVector, ListingInput, Result, TrainingExample,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Encoders fitted on the training corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTransformer {
    /// Category label encoder.
    pub category_encoder: CategoricalEncoder,
    /// Condition label encoder.
    pub condition_encoder: CategoricalEncoder,
}

impl FeatureTransformer {
    /// Fit encoders on the full corpus and return the raw (unscaled) feature
    /// matrix with its targets.
    pub fn fit(examples: &[TrainingExample]) -> Result<(Self, Vec<FeatureVector>, Vec<f64>)> {
        if examples.is_empty() {
            return Err(Error::insufficient_data("no training examples to fit encoders on"));
        }

        let transformer = Self {
            category_encoder: CategoricalEncoder::fit(
                CategoricalField::Category,
                examples.iter().map(|e| e.category.as_str()),
            ),
            condition_encoder: CategoricalEncoder::fit(
                CategoricalField::Condition,
                examples.iter().map(|e| e.condition.as_str()),
            ),
        };

        let rows = examples
            .iter()
            .map(|e| transformer.transform_example(e))
            .collect::<Result<Vec<_>>>()?;
        let targets = examples.iter().map(|e| e.target_price).collect();

        info!(
            rows = examples.len(),
            categories = transformer.category_encoder.len(),
            conditions = transformer.condition_encoder.len(),
            "Fitted categorical encoders"
        );
        Ok((transformer, rows, targets))
    }

    /// Raw features for a historical example.
    pub fn transform_example(&self, example: &TrainingExample) -> Result<FeatureVector> {
        self.assemble(
            example.starting_bid,
            example.duration_days,
            example.year,
            example.month,
            example.watchers,
            &example.category,
            &example.condition,
        )
    }

    /// Raw features for a new listing priced at `now`.
    pub fn transform_listing(
        &self,
        listing: &ListingInput,
        now: DateTime<Utc>,
    ) -> Result<FeatureVector> {
        let (year, month) = year_month(now);
        self.assemble(
            listing.starting_bid,
            listing.duration_days.max(0),
            year,
            month,
            listing.watchers,
            &listing.category,
            &listing.condition,
        )
    }

    /// Both encoders cover their own field and have dense codes.
    pub fn is_consistent(&self) -> bool {
        self.category_encoder.field() == CategoricalField::Category
            && self.condition_encoder.field() == CategoricalField::Condition
            && !self.category_encoder.is_empty()
            && !self.condition_encoder.is_empty()
            && self.category_encoder.is_dense()
            && self.condition_encoder.is_dense()
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        &self,
        starting_bid: f64,
        duration_days: i64,
        year: i32,
        month: u32,
        watchers: u32,
        category: &str,
        condition: &str,
    ) -> Result<FeatureVector> {
        let category_code = self.category_encoder.transform(category)?;
        let condition_code = self.condition_encoder.transform(condition)?;

        Ok([
            starting_bid,
            duration_days as f64,
            year as f64,
            month as f64,
            watchers as f64,
            category_code as f64,
            condition_code as f64,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_example(category: &str, condition: &str, starting_bid: f64) -> TrainingExample {
        TrainingExample {
            starting_bid,
            category: category.to_string(),
            condition: condition.to_string(),
            duration_days: 5,
            year: 2024,
            month: 3,
            watchers: 2,
            target_price: starting_bid * 1.5,
        }
    }

    fn make_listing(category: &str, condition: &str) -> ListingInput {
        ListingInput {
            starting_bid: 100.0,
            category: category.to_string(),
            condition: condition.to_string(),
            duration_days: 7,
            watchers: 5,
        }
    }

    #[test]
    fn test_fit_column_order() {
        let examples = vec![
            make_example("electronics", "used", 10.0),
            make_example("collectibles", "new", 20.0),
        ];
        let (transformer, rows, targets) = FeatureTransformer::fit(&examples).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], [10.0, 5.0, 2024.0, 3.0, 2.0, 1.0, 1.0]);
        assert_eq!(rows[1], [20.0, 5.0, 2024.0, 3.0, 2.0, 0.0, 0.0]);
        assert_eq!(targets, vec![15.0, 30.0]);
        assert!(transformer.is_consistent());
    }

    #[test]
    fn test_listing_uses_serving_date() {
        let examples = vec![make_example("electronics", "new", 10.0)];
        let (transformer, _, _) = FeatureTransformer::fit(&examples).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 16, 9, 0, 0).unwrap();

        let row = transformer
            .transform_listing(&make_listing("electronics", "new"), now)
            .unwrap();
        assert_eq!(row, [100.0, 7.0, 2026.0, 10.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn test_negative_listing_duration_clamped() {
        let (transformer, _, _) =
            FeatureTransformer::fit(&[make_example("art", "new", 10.0)]).unwrap();
        let mut listing = make_listing("art", "new");
        listing.duration_days = -2;

        let row = transformer.transform_listing(&listing, Utc::now()).unwrap();
        assert_eq!(row[1], 0.0);
    }

    #[test]
    fn test_unknown_labels() {
        let (transformer, _, _) =
            FeatureTransformer::fit(&[make_example("electronics", "new", 10.0)]).unwrap();

        let err = transformer
            .transform_listing(&make_listing("nonexistent_category", "new"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCategory(_)));

        let err = transformer
            .transform_listing(&make_listing("electronics", "broken"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCondition(_)));
    }

    #[test]
    fn test_empty_corpus() {
        assert!(matches!(
            FeatureTransformer::fit(&[]),
            Err(Error::InsufficientData(_))
        ));
    }
}
