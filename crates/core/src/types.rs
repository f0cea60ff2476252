//! Core data types for the auction price estimator.

use chrono::{DateTime, Datelike, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Number of model input features.
pub const FEATURE_COUNT: usize = 7;

/// Feature names in model column order. Model weights are positional, so
/// training and serving must both emit this order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "starting_bid",
    "duration_days",
    "year",
    "month",
    "watchers",
    "category_code",
    "condition_code",
];

/// One row of the numeric feature space, ordered as [`FEATURE_NAMES`].
pub type FeatureVector = [f64; FEATURE_COUNT];

/// Lifecycle status of an auction document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionStatus {
    Active,
    Ended,
    Sold,
    Cancelled,
    /// Any status this system does not know about.
    #[serde(other)]
    Unknown,
}

impl AuctionStatus {
    /// Completed auctions whose final price is settled.
    pub fn is_completed(self) -> bool {
        matches!(self, AuctionStatus::Ended | AuctionStatus::Sold)
    }
}

/// A single bid in an auction's history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bid {
    /// Bid amount.
    #[serde(default)]
    pub amount: Option<f64>,
    /// When the bid was placed.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Raw historical auction document as stored in the document store.
///
/// Every attribute is optional at this layer; records missing a field the
/// model needs are excluded during preprocessing rather than imputed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRecord {
    /// Document identifier, if the export carried one.
    #[serde(default, rename = "_id", deserialize_with = "deserialize_document_id")]
    pub id: Option<String>,
    /// Opening price.
    #[serde(default)]
    pub starting_bid: Option<f64>,
    /// Final settled price.
    #[serde(default)]
    pub current_bid: Option<f64>,
    /// Listing category.
    #[serde(default)]
    pub category: Option<String>,
    /// Item condition.
    #[serde(default)]
    pub condition: Option<String>,
    /// Auction start.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    /// Auction end.
    #[serde(default, deserialize_with = "deserialize_timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    /// Number of users watching the listing.
    #[serde(default)]
    pub watchers: Option<u32>,
    /// Lifecycle status.
    #[serde(default = "default_status")]
    pub status: AuctionStatus,
    /// Bid history, oldest first.
    #[serde(default)]
    pub bids: Vec<Bid>,
}

fn default_status() -> AuctionStatus {
    AuctionStatus::Unknown
}

impl AuctionRecord {
    /// Eligible for training: completed, with at least one bid.
    pub fn is_eligible(&self) -> bool {
        self.status.is_completed() && !self.bids.is_empty()
    }

    /// Identifier for log lines.
    pub fn label(&self) -> &str {
        self.id.as_deref().unwrap_or("<no id>")
    }
}

/// A labeled row derived from an eligible [`AuctionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub starting_bid: f64,
    pub category: String,
    pub condition: String,
    /// Whole days between start and end, never negative.
    pub duration_days: i64,
    pub year: i32,
    pub month: u32,
    pub watchers: u32,
    /// Final settled price (always > 0).
    pub target_price: f64,
}

/// Declared attributes of a listing to price. The listing has not started
/// yet, so calendar features come from the serving instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingInput {
    pub starting_bid: f64,
    pub category: String,
    pub condition: String,
    pub duration_days: i64,
    pub watchers: u32,
}

impl ListingInput {
    /// Reject inputs the model cannot meaningfully price.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.starting_bid.is_finite() || self.starting_bid <= 0.0 {
            return Err(crate::Error::invalid_input(format!(
                "starting bid must be a positive number, got {}",
                self.starting_bid
            )));
        }
        Ok(())
    }
}

/// Calendar year and month of an instant (UTC).
#[inline]
pub fn year_month(ts: DateTime<Utc>) -> (i32, u32) {
    (ts.year(), ts.month())
}

/// Timestamp encodings found in document-store exports.
#[derive(Deserialize)]
#[serde(untagged)]
enum TimestampRepr {
    Text(String),
    Millis(i64),
    Extended {
        #[serde(rename = "$date")]
        date: ExtendedDate,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExtendedDate {
    Text(String),
    Millis(i64),
    Long {
        #[serde(rename = "$numberLong")]
        value: String,
    },
}

/// Parse an ISO-8601 timestamp; naive timestamps are taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    let repr = Option::<TimestampRepr>::deserialize(deserializer)?;
    let millis_to_ts = |ms: i64| {
        DateTime::from_timestamp_millis(ms)
            .ok_or_else(|| D::Error::custom(format!("timestamp {} out of range", ms)))
    };
    let text_to_ts = |text: &str| {
        parse_timestamp(text).ok_or_else(|| D::Error::custom(format!("bad timestamp {:?}", text)))
    };

    match repr {
        None => Ok(None),
        Some(TimestampRepr::Text(text)) => text_to_ts(&text).map(Some),
        Some(TimestampRepr::Millis(ms)) => millis_to_ts(ms).map(Some),
        Some(TimestampRepr::Extended { date }) => match date {
            ExtendedDate::Text(text) => text_to_ts(&text).map(Some),
            ExtendedDate::Millis(ms) => millis_to_ts(ms).map(Some),
            ExtendedDate::Long { value } => {
                let ms = value
                    .parse::<i64>()
                    .map_err(|_| D::Error::custom(format!("bad $numberLong {:?}", value)))?;
                millis_to_ts(ms).map(Some)
            }
        },
    }
}

/// Document ids arrive either as plain strings or as `{"$oid": "..."}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DocumentIdRepr {
    Text(String),
    ObjectId {
        #[serde(rename = "$oid")]
        oid: String,
    },
}

fn deserialize_document_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<DocumentIdRepr>::deserialize(deserializer)?.map(|repr| match repr {
            DocumentIdRepr::Text(text) => text,
            DocumentIdRepr::ObjectId { oid } => oid,
        }),
    )
}
