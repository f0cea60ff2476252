//! Derivation of training examples from raw auction documents.
//!
//! Records missing a required attribute are excluded, never imputed.

use auction_core::{year_month, AuctionRecord, TrainingExample};
use thiserror::Error;
use tracing::{debug, info};

/// Why a record did not become a training example.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExclusionReason {
    /// A field the model needs is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// Final price is zero or negative.
    #[error("final price is not positive")]
    NonPositivePrice,
    /// Starting bid is negative or not finite.
    #[error("starting bid is invalid")]
    InvalidStartingBid,
}

/// Counts of accepted and excluded records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    /// Records seen.
    pub total: usize,
    /// Records turned into examples.
    pub accepted: usize,
    /// Records missing a required field.
    pub missing_field: usize,
    /// Records with a non-positive final price.
    pub non_positive_price: usize,
    /// Records with an invalid starting bid.
    pub invalid_starting_bid: usize,
}

impl PreprocessStats {
    /// Number of excluded records.
    pub fn excluded(&self) -> usize {
        self.total - self.accepted
    }

    fn record(&mut self, reason: ExclusionReason) {
        match reason {
            ExclusionReason::MissingField(_) => self.missing_field += 1,
            ExclusionReason::NonPositivePrice => self.non_positive_price += 1,
            ExclusionReason::InvalidStartingBid => self.invalid_starting_bid += 1,
        }
    }
}

/// Builds training examples from eligible auction records.
#[derive(Debug, Default)]
pub struct ExampleBuilder {
    stats: PreprocessStats,
}

impl ExampleBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a single example.
    pub fn derive(record: &AuctionRecord) -> Result<TrainingExample, ExclusionReason> {
        let starting_bid = record
            .starting_bid
            .ok_or(ExclusionReason::MissingField("startingBid"))?;
        let target_price = record
            .current_bid
            .ok_or(ExclusionReason::MissingField("currentBid"))?;
        let category = record
            .category
            .as_ref()
            .ok_or(ExclusionReason::MissingField("category"))?;
        let condition = record
            .condition
            .as_ref()
            .ok_or(ExclusionReason::MissingField("condition"))?;
        let start = record
            .start_time
            .ok_or(ExclusionReason::MissingField("startTime"))?;
        let end = record
            .end_time
            .ok_or(ExclusionReason::MissingField("endTime"))?;
        let watchers = record
            .watchers
            .ok_or(ExclusionReason::MissingField("watchers"))?;

        if !(target_price.is_finite() && target_price > 0.0) {
            return Err(ExclusionReason::NonPositivePrice);
        }
        if !(starting_bid.is_finite() && starting_bid >= 0.0) {
            return Err(ExclusionReason::InvalidStartingBid);
        }

        // An end before the start counts as a zero-day auction.
        let duration_days = (end - start).num_days().max(0);
        let (year, month) = year_month(start);

        Ok(TrainingExample {
            starting_bid,
            category: category.clone(),
            condition: condition.clone(),
            duration_days,
            year,
            month,
            watchers,
            target_price,
        })
    }

    /// Derive examples from all records, tracking exclusions.
    pub fn build(&mut self, records: &[AuctionRecord]) -> Vec<TrainingExample> {
        let mut examples = Vec::with_capacity(records.len());

        for record in records {
            self.stats.total += 1;
            match Self::derive(record) {
                Ok(example) => {
                    self.stats.accepted += 1;
                    examples.push(example);
                }
                Err(reason) => {
                    debug!(record = record.label(), %reason, "Excluding record");
                    self.stats.record(reason);
                }
            }
        }

        info!(
            accepted = self.stats.accepted,
            excluded = self.stats.excluded(),
            "Derived training examples"
        );
        examples
    }

    /// Statistics accumulated so far.
    pub fn stats(&self) -> &PreprocessStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use auction_core::{AuctionStatus, Bid};
    use chrono::{Duration, TimeZone, Utc};

    fn make_record(starting_bid: f64, current_bid: f64, days: i64) -> AuctionRecord {
        let start = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        AuctionRecord {
            id: Some("r1".to_string()),
            starting_bid: Some(starting_bid),
            current_bid: Some(current_bid),
            category: Some("Electronics".to_string()),
            condition: Some("New".to_string()),
            start_time: Some(start),
            end_time: Some(start + Duration::days(days) + Duration::hours(5)),
            watchers: Some(3),
            status: AuctionStatus::Ended,
            bids: vec![Bid::default()],
        }
    }

    #[test]
    fn test_derive_example() {
        let example = ExampleBuilder::derive(&make_record(20.0, 55.0, 7)).unwrap();

        assert_abs_diff_eq!(example.starting_bid, 20.0);
        assert_abs_diff_eq!(example.target_price, 55.0);
        assert_eq!(example.duration_days, 7); // partial day truncated
        assert_eq!(example.year, 2024);
        assert_eq!(example.month, 5);
        assert_eq!(example.watchers, 3);
    }

    #[test]
    fn test_negative_duration_clamped() {
        let example = ExampleBuilder::derive(&make_record(20.0, 55.0, -3)).unwrap();
        assert_eq!(example.duration_days, 0);
    }

    #[test]
    fn test_missing_watchers_excluded() {
        let mut record = make_record(20.0, 55.0, 2);
        record.watchers = None;
        assert_eq!(
            ExampleBuilder::derive(&record),
            Err(ExclusionReason::MissingField("watchers"))
        );

        let mut builder = ExampleBuilder::new();
        assert!(builder.build(&[record]).is_empty());
        assert_eq!(builder.stats().missing_field, 1);
        assert_eq!(builder.stats().accepted, 0);
    }

    #[test]
    fn test_exclusions() {
        let mut missing_category = make_record(20.0, 55.0, 2);
        missing_category.category = None;
        let mut missing_end = make_record(20.0, 55.0, 2);
        missing_end.end_time = None;

        assert_eq!(
            ExampleBuilder::derive(&missing_category),
            Err(ExclusionReason::MissingField("category"))
        );
        assert_eq!(
            ExampleBuilder::derive(&missing_end),
            Err(ExclusionReason::MissingField("endTime"))
        );
        assert_eq!(
            ExampleBuilder::derive(&make_record(20.0, 0.0, 2)),
            Err(ExclusionReason::NonPositivePrice)
        );
        assert_eq!(
            ExampleBuilder::derive(&make_record(-1.0, 10.0, 2)),
            Err(ExclusionReason::InvalidStartingBid)
        );
    }

    #[test]
    fn test_build_tracks_stats() {
        let mut missing = make_record(5.0, 9.0, 1);
        missing.starting_bid = None;
        let records = vec![
            make_record(10.0, 12.0, 3),
            make_record(10.0, -4.0, 3),
            missing,
            make_record(15.0, 30.0, 5),
        ];

        let mut builder = ExampleBuilder::new();
        let examples = builder.build(&records);

        assert_eq!(examples.len(), 2);
        let stats = builder.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.non_positive_price, 1);
        assert_eq!(stats.missing_field, 1);
        assert_eq!(stats.excluded(), 2);
    }
}
