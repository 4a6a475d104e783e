//! # Dragevents - event calendar data tool
//!
//! Maintains a SQLite store of tracks, events, event classes and class rules
//! for a drag racing calendar, and exports a nested JSON snapshot for the
//! static site.
//!
//! Dragevents provides:
//! - Ordered SQL migration scripts applied from a directory
//! - A typed repository over the four tables with null-safe field mapping
//! - Streaming, header-validated CSV import
//! - Export of `tracks.json` / `events.json` with classes and rules nested

pub mod timestamp;
pub mod model;
pub mod storage;
pub mod import;
pub mod export;
pub mod prompt;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use timestamp::Timestamp;
pub use model::{Event, EventClass, EventClassRule, NewEvent, NewEventClass, NewEventClassRule, NewTrack, Track};
pub use storage::SqliteStore;
pub use import::{CsvSchema, ImportFailure, ImportKind};
pub use export::{ExportSummary, Snapshot};

use std::path::PathBuf;

/// Result type alias for Dragevents operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Dragevents operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("migrate {script}: {source}")]
    Migration {
        script: String,
        source: rusqlite::Error,
    },

    #[error("{}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("read CSV header: input is empty")]
    MissingHeader,

    #[error("invalid CSV header: expected [{}], got [{}]", expected.join(","), found.join(","))]
    HeaderMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("read CSV line {line}: {source}")]
    Csv {
        line: usize,
        source: csv::Error,
    },

    #[error("line {line}: expected {expected} columns, got {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}: invalid {field}: {message}")]
    InvalidField {
        line: usize,
        field: &'static str,
        message: String,
    },

    #[error("line {line}: insert {entity}: {source}")]
    Insert {
        line: usize,
        entity: &'static str,
        source: rusqlite::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
