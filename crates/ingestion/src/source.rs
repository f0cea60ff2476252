//! Historical auction data sources.
//!
//! Every source hands back only records eligible for training: completed
//! (`ended` or `sold`) auctions with a non-empty bid history.

use auction_core::config::{SourceConfig, SourceKind};
use auction_core::{AuctionRecord, Error, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A store of completed auctions.
pub trait AuctionSource {
    /// Fetch all records eligible for training.
    fn fetch_eligible(&self) -> Result<Vec<AuctionRecord>>;

    /// Human-readable description for logs.
    fn describe(&self) -> String;
}

impl<S: AuctionSource + ?Sized> AuctionSource for Box<S> {
    fn fetch_eligible(&self) -> Result<Vec<AuctionRecord>> {
        (**self).fetch_eligible()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Open the source described by configuration.
pub fn open_source(config: &SourceConfig) -> Result<Box<dyn AuctionSource>> {
    match config.kind {
        SourceKind::JsonExport => Ok(Box::new(JsonExportSource::new(&config.path))),
        SourceKind::Sqlite => Ok(Box::new(SqliteAuctionSource::new(&config.path, &config.table)?)),
    }
}

/// In-memory records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<AuctionRecord>,
}

impl MemorySource {
    /// Create a source over the given records.
    pub fn new(records: Vec<AuctionRecord>) -> Self {
        Self { records }
    }
}

impl AuctionSource for MemorySource {
    fn fetch_eligible(&self) -> Result<Vec<AuctionRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.is_eligible())
            .cloned()
            .collect())
    }

    fn describe(&self) -> String {
        format!("memory ({} records)", self.records.len())
    }
}

/// Document-store export file: a JSON array, or one document per line.
#[derive(Debug, Clone)]
pub struct JsonExportSource {
    path: PathBuf,
}

impl JsonExportSource {
    /// Create a source reading the given export file.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Parse export text into records, skipping documents that do not fit
    /// the auction schema.
    pub fn parse(text: &str) -> Result<Vec<AuctionRecord>> {
        let trimmed = text.trim_start();
        let documents: Vec<serde_json::Value> = if trimmed.starts_with('[') {
            serde_json::from_str(trimmed)?
        } else {
            let mut docs = Vec::new();
            for (line_no, line) in text.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str(line) {
                    Ok(doc) => docs.push(doc),
                    Err(e) => warn!(line = line_no + 1, error = %e, "Skipping malformed export line"),
                }
            }
            docs
        };

        let mut records = Vec::with_capacity(documents.len());
        for (index, doc) in documents.into_iter().enumerate() {
            match serde_json::from_value::<AuctionRecord>(doc) {
                Ok(record) => records.push(record),
                Err(e) => warn!(index, error = %e, "Skipping document that does not fit the auction schema"),
            }
        }
        Ok(records)
    }
}

impl AuctionSource for JsonExportSource {
    fn fetch_eligible(&self) -> Result<Vec<AuctionRecord>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            Error::database(format!("cannot read export {}: {}", self.path.display(), e))
        })?;
        let records = Self::parse(&text)?;
        let total = records.len();
        let eligible: Vec<AuctionRecord> = records.into_iter().filter(|r| r.is_eligible()).collect();

        debug!(total, eligible = eligible.len(), "Filtered export documents");
        Ok(eligible)
    }

    fn describe(&self) -> String {
        format!("json export {}", self.path.display())
    }
}

/// SQLite table of auction documents stored as JSON text in a `doc` column.
#[derive(Debug, Clone)]
pub struct SqliteAuctionSource {
    path: PathBuf,
    table: String,
}

impl SqliteAuctionSource {
    /// Create a source over `table` in the database at `path`.
    pub fn new(path: impl AsRef<Path>, table: &str) -> Result<Self> {
        if table.is_empty() || !table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::config(format!("invalid table name {:?}", table)));
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            table: table.to_string(),
        })
    }

    fn eligible_query(&self) -> String {
        format!(
            "SELECT doc FROM {} \
             WHERE json_extract(doc, '$.status') IN ('ended', 'sold') \
             AND json_array_length(doc, '$.bids') > 0",
            self.table
        )
    }
}

impl AuctionSource for SqliteAuctionSource {
    fn fetch_eligible(&self) -> Result<Vec<AuctionRecord>> {
        let conn = Connection::open_with_flags(&self.path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| {
                Error::database(format!("cannot open {}: {}", self.path.display(), e))
            })?;

        let mut stmt = conn
            .prepare(&self.eligible_query())
            .map_err(|e| Error::database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::database(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let doc = row.map_err(|e| Error::database(e.to_string()))?;
            match serde_json::from_str::<AuctionRecord>(&doc) {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, "Skipping document that does not fit the auction schema"),
            }
        }

        info!(table = %self.table, records = records.len(), "Fetched eligible auctions");
        Ok(records)
    }

    fn describe(&self) -> String {
        format!("sqlite {} table {}", self.path.display(), self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOLD: &str = r#"{"_id": "a1", "startingBid": 10, "currentBid": 25, "category": "Books", "condition": "Good", "startTime": "2024-01-01T00:00:00Z", "endTime": "2024-01-04T00:00:00Z", "status": "sold", "bids": [{"amount": 25}]}"#;
    const ACTIVE: &str = r#"{"_id": "a2", "startingBid": 10, "status": "active", "bids": [{"amount": 12}]}"#;
    const NO_BIDS: &str = r#"{"_id": "a3", "startingBid": 10, "status": "ended", "bids": []}"#;

    #[test]
    fn test_parse_json_array() {
        let text = format!("[{}, {}, {}]", SOLD, ACTIVE, NO_BIDS);
        let records = JsonExportSource::parse(&text).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_parse_lines_skips_garbage() {
        let text = format!("{}\nnot json\n\n{}\n{{\"watchers\": \"many\"}}\n", SOLD, ACTIVE);
        let records = JsonExportSource::parse(&text).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_export_source_filters_eligible() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auctions.json");
        std::fs::write(&path, format!("{}\n{}\n{}\n", SOLD, ACTIVE, NO_BIDS)).unwrap();

        let source = JsonExportSource::new(&path);
        let records = source.fetch_eligible().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_missing_export_is_database_error() {
        let source = JsonExportSource::new("/nonexistent/auctions.json");
        assert!(matches!(source.fetch_eligible(), Err(Error::Database(_))));
    }

    #[test]
    fn test_sqlite_source_pushes_filter_into_query() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auctions.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE auctions (id INTEGER PRIMARY KEY, doc TEXT NOT NULL)", [])
                .unwrap();
            for doc in [SOLD, ACTIVE, NO_BIDS] {
                conn.execute("INSERT INTO auctions (doc) VALUES (?1)", [doc]).unwrap();
            }
        }

        let source = SqliteAuctionSource::new(&path, "auctions").unwrap();
        let records = source.fetch_eligible().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].current_bid, Some(25.0));
    }

    #[test]
    fn test_sqlite_rejects_bad_table_name() {
        assert!(SqliteAuctionSource::new("x.db", "auctions--").is_err());
    }

    #[test]
    fn test_memory_source_filters() {
        let records = JsonExportSource::parse(&format!("[{}, {}]", SOLD, NO_BIDS)).unwrap();
        let source = MemorySource::new(records);
        assert_eq!(source.fetch_eligible().unwrap().len(), 1);
        assert!(source.describe().contains("2 records"));
    }
}
