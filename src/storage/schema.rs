//! Schema migrations - ordered SQL scripts applied from a directory
//!
//! Scripts are plain `.sql` files whose names start with a zero-padded
//! sequence number (`001_create_tracks.sql`, `002_...`). They run in
//! lexicographic file-name order, each as a single batch. The first failing
//! script stops the run; scripts before it stay applied.

use crate::{Error, Result};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// File extension of migration scripts
pub const MIGRATION_EXTENSION: &str = "sql";

/// Default migrations directory, relative to the working directory
pub const DEFAULT_MIGRATIONS_DIR: &str = "db/migrate";

/// Tables owned by the schema, parents first
pub const TABLES: &[&str] = &["tracks", "events", "event_classes", "event_class_rules"];

/// List migration scripts in `dir`, sorted by file name
pub fn migration_scripts(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut scripts = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some(MIGRATION_EXTENSION) {
            scripts.push(path);
        }
    }
    scripts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(scripts)
}

/// Apply every script in `dir` to `conn`, returning the applied file names
pub fn apply_migrations(conn: &Connection, dir: &Path) -> Result<Vec<String>> {
    let mut applied = Vec::new();

    for path in migration_scripts(dir)? {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let sql = std::fs::read_to_string(&path)?;

        tracing::debug!("Applying migration {}", name);
        conn.execute_batch(&sql).map_err(|source| Error::Migration {
            script: name.clone(),
            source,
        })?;
        applied.push(name);
    }

    tracing::info!("Applied {} migration(s) from {}", applied.len(), dir.display());
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::migrations_dir;

    fn table_exists(conn: &Connection, table: &str) -> bool {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .unwrap()
            == 1
    }

    #[test]
    fn test_shipped_migrations_create_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        let applied = apply_migrations(&conn, &migrations_dir()).unwrap();
        assert_eq!(applied.len(), 4);

        for table in TABLES {
            assert!(table_exists(&conn, table), "missing table {}", table);
        }

        let end_column: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('events') WHERE name = 'end_datetime'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(end_column, 1);
    }

    #[test]
    fn test_migrations_are_rerunnable() {
        let conn = Connection::open_in_memory().unwrap();
        apply_migrations(&conn, &migrations_dir()).unwrap();
        apply_migrations(&conn, &migrations_dir()).unwrap();
    }

    #[test]
    fn test_scripts_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("010_last.sql"), "SELECT 1;").unwrap();
        std::fs::write(dir.path().join("002_second.sql"), "SELECT 1;").unwrap();
        std::fs::write(dir.path().join("001_first.sql"), "SELECT 1;").unwrap();
        std::fs::write(dir.path().join("README.md"), "not a script").unwrap();
        std::fs::create_dir(dir.path().join("003_dir.sql")).unwrap();

        let names: Vec<String> = migration_scripts(dir.path())
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["001_first.sql", "002_second.sql", "010_last.sql"]);
    }

    #[test]
    fn test_failing_script_stops_the_run() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("001_ok.sql"), "CREATE TABLE a (id INTEGER);").unwrap();
        std::fs::write(dir.path().join("002_bad.sql"), "CREATE TABLE oops (").unwrap();
        std::fs::write(dir.path().join("003_never.sql"), "CREATE TABLE c (id INTEGER);").unwrap();

        let conn = Connection::open_in_memory().unwrap();
        let err = apply_migrations(&conn, dir.path()).unwrap_err();
        match err {
            Error::Migration { script, .. } => assert_eq!(script, "002_bad.sql"),
            other => panic!("unexpected error: {other}"),
        }

        // Partial application is kept
        assert!(table_exists(&conn, "a"));
        assert!(!table_exists(&conn, "c"));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let conn = Connection::open_in_memory().unwrap();
        let err = apply_migrations(&conn, Path::new("/nonexistent/migrations")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
