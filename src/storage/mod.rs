//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - tracks(id, name, city, address, url)
//! - events(id, title, track_id, start_datetime, end_datetime, driver_fee, spectator_fee, url, description)
//! - event_classes(id, event_id, name, buyin_fee)
//! - event_class_rules(id, event_class_id, rule)
//!
//! Tables are created by the SQL scripts in `db/migrate/`.

pub mod schema;
pub mod seed;
pub mod sqlite;

pub use seed::SeedReport;
pub use sqlite::{DbStats, DeleteReport, SqliteStore};
