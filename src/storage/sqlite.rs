//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, params};
use rusqlite::types::ValueRef;
use crate::Result;
use crate::model::{
    Event, EventClass, EventClassRule, NewEvent, NewEventClass, NewEventClassRule, NewTrack, Track,
};
use crate::timestamp::Timestamp;
use super::schema;

/// SQLite-backed repository for the event calendar
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file, creating its directory if needed.
    ///
    /// The schema is not checked; run [`migrate`](Self::migrate) first on a
    /// fresh file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tracing::debug!("Creating database directory {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    /// Apply the migration scripts in `dir`, returning the applied file names
    pub fn migrate(&self, dir: &Path) -> Result<Vec<String>> {
        schema::apply_migrations(&self.conn, dir)
    }

    // ========== Track Operations ==========

    /// Insert a track, returning its id
    pub fn create_track(&self, track: &NewTrack) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO tracks (name, city, address, url) VALUES (?1, ?2, ?3, ?4)",
            params![track.name, track.city, track.address, track.url],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created track {} ({})", id, track.name);
        Ok(id)
    }

    /// All tracks, alphabetical by name
    pub fn list_tracks(&self) -> Result<Vec<Track>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, city, address, url FROM tracks ORDER BY name, id"
        )?;

        let tracks = stmt
            .query_map([], row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(tracks)
    }

    // ========== Event Operations ==========

    /// Insert an event, returning its id.
    ///
    /// An empty `end_date` is stored as NULL.
    pub fn create_event(&self, event: &NewEvent) -> Result<i64> {
        let end_date = (!event.end_date.is_empty()).then_some(event.end_date.as_str());

        self.conn.execute(
            r#"
            INSERT INTO events (title, track_id, start_datetime, end_datetime, driver_fee, spectator_fee, url, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                event.title,
                event.track_id,
                event.start_date,
                end_date,
                event.driver_fee,
                event.spectator_fee,
                event.url,
                event.description,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!("Created event {} ({})", id, event.title);
        Ok(id)
    }

    /// All events with their track name, ordered by start time.
    ///
    /// Timestamps that match no known layout come back as
    /// [`Timestamp::Unparsed`] and sort as the default instant.
    pub fn list_events(&self) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT e.id, e.title, e.track_id, t.name, e.start_datetime, e.end_datetime,
                   e.driver_fee, e.spectator_fee, e.url, e.description
            FROM events e JOIN tracks t ON e.track_id = t.id
            ORDER BY e.start_datetime, e.id
            "#
        )?;

        let mut events = stmt
            .query_map([], row_to_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // Text order differs from time order when layouts or offsets are mixed
        events.sort_by_key(|e| e.start_date.value());

        let unparsed = events.iter().filter(|e| e.has_unparsed_dates()).count();
        if unparsed > 0 {
            tracing::debug!("{} event(s) have unparsed timestamps", unparsed);
        }

        Ok(events)
    }

    /// Delete an event together with its classes and their rules.
    ///
    /// Runs three statements bottom-up (rules, classes, event) without a
    /// transaction. A missing id deletes nothing and is not an error.
    pub fn delete_event(&self, event_id: i64) -> Result<DeleteReport> {
        let rules = self.conn.execute(
            "DELETE FROM event_class_rules WHERE event_class_id IN (SELECT id FROM event_classes WHERE event_id = ?1)",
            [event_id],
        )?;
        let classes = self.conn.execute(
            "DELETE FROM event_classes WHERE event_id = ?1",
            [event_id],
        )?;
        let events = self.conn.execute("DELETE FROM events WHERE id = ?1", [event_id])?;

        let report = DeleteReport { events, classes, rules };
        tracing::info!("Deleted event {}: {}", event_id, report);
        Ok(report)
    }

    // ========== Class Operations ==========

    /// Insert an event class, returning its id
    pub fn create_event_class(&self, class: &NewEventClass) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO event_classes (event_id, name, buyin_fee) VALUES (?1, ?2, ?3)",
            params![class.event_id, class.name, class.buyin_fee],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All event classes ordered by (event_id, id)
    pub fn list_event_classes(&self) -> Result<Vec<EventClass>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_id, name, buyin_fee FROM event_classes ORDER BY event_id, id"
        )?;

        let classes = stmt
            .query_map([], row_to_class)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(classes)
    }

    // ========== Rule Operations ==========

    /// Insert a class rule, returning its id
    pub fn create_event_class_rule(&self, rule: &NewEventClassRule) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO event_class_rules (event_class_id, rule) VALUES (?1, ?2)",
            params![rule.event_class_id, rule.rule],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// All class rules ordered by (event_class_id, id)
    pub fn list_event_class_rules(&self) -> Result<Vec<EventClassRule>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, event_class_id, rule FROM event_class_rules ORDER BY event_class_id, id"
        )?;

        let rules = stmt
            .query_map([], |row| {
                Ok(EventClassRule {
                    id: row.get(0)?,
                    event_class_id: row.get(1)?,
                    rule: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rules)
    }

    // ========== Statistics ==========

    fn count_rows(&self, table: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        Ok(DbStats {
            tracks: self.count_rows("tracks")?,
            events: self.count_rows("events")?,
            classes: self.count_rows("event_classes")?,
            rules: self.count_rows("event_class_rules")?,
        })
    }
}

fn row_to_track(row: &rusqlite::Row) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        name: row.get(1)?,
        city: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        address: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
    })
}

/// Column text for a DATETIME value.
///
/// NUMERIC affinity stores digit-only text as INTEGER or REAL, so those come
/// back as their text form instead of a type error.
fn timestamp_text(row: &rusqlite::Row, index: usize) -> rusqlite::Result<Option<String>> {
    let text = match row.get_ref(index)? {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
    };
    Ok(text)
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<Event> {
    let start = timestamp_text(row, 4)?.unwrap_or_default();
    let end = timestamp_text(row, 5)?;

    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        track_id: row.get(2)?,
        track_name: row.get(3)?,
        start_date: Timestamp::parse(&start),
        end_date: end.as_deref().map(Timestamp::parse),
        driver_fee: row.get(6)?,
        spectator_fee: row.get(7)?,
        url: row.get::<_, Option<String>>(8)?.unwrap_or_default(),
        description: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
        classes: Vec::new(),
    })
}

fn row_to_class(row: &rusqlite::Row) -> rusqlite::Result<EventClass> {
    Ok(EventClass {
        id: row.get(0)?,
        event_id: row.get(1)?,
        name: row.get(2)?,
        buyin_fee: row.get(3)?,
        rules: Vec::new(),
    })
}

/// Rows removed by [`SqliteStore::delete_event`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteReport {
    pub events: usize,
    pub classes: usize,
    pub rules: usize,
}

impl DeleteReport {
    /// True if the event row existed
    pub fn found(&self) -> bool {
        self.events > 0
    }
}

impl std::fmt::Display for DeleteReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} event(s), {} class(es), {} rule(s)",
            self.events, self.classes, self.rules
        )
    }
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbStats {
    pub tracks: usize,
    pub events: usize,
    pub classes: usize,
    pub rules: usize,
}

impl std::fmt::Display for DbStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Database Statistics:")?;
        writeln!(f, "  Tracks: {}", self.tracks)?;
        writeln!(f, "  Events: {}", self.events)?;
        writeln!(f, "  Classes: {}", self.classes)?;
        writeln!(f, "  Rules: {}", self.rules)
    }
}
