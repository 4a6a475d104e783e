//! CSV import - streaming, header-validated bulk loading
//!
//! Every import follows the same protocol, implemented once in
//! [`import_csv`]:
//!
//! 1. The first record must equal the schema's header exactly (same names,
//!    same order). Otherwise nothing is imported.
//! 2. Remaining records are read one at a time. Each must have exactly as many
//!    columns as the header and is handed to a per-row function that parses
//!    and inserts it.
//! 3. The first failing row stops the import. Rows inserted before it stay in
//!    the database and their count is reported in [`ImportFailure`].
//!
//! Line numbers in errors come from the CSV reader's position: the 1-based
//! file line where it started the record, so quoted fields spanning several
//! lines are counted. The reader skips blank lines after taking that position,
//! so a blank line directly before a record is not.

use crate::model::{NewEvent, NewEventClass, NewEventClassRule};
use crate::storage::SqliteStore;
use crate::{Error, Result};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Expected layout of one CSV import file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvSchema {
    /// Entity name used in messages
    pub entity: &'static str,
    /// Column names, in order
    pub header: &'static [&'static str],
}

impl CsvSchema {
    pub fn columns(&self) -> usize {
        self.header.len()
    }
}

pub const EVENTS: CsvSchema = CsvSchema {
    entity: "event",
    header: &[
        "title",
        "track_id",
        "start_date",
        "end_date",
        "driver_fee",
        "spectator_fee",
        "url",
        "description",
    ],
};

pub const EVENT_CLASSES: CsvSchema = CsvSchema {
    entity: "class",
    header: &["event_id", "name", "buyin_fee"],
};

pub const EVENT_CLASS_RULES: CsvSchema = CsvSchema {
    entity: "rule",
    header: &["event_class_id", "rule"],
};

/// Which entity a CSV file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Events,
    EventClasses,
    EventClassRules,
}

impl ImportKind {
    pub fn schema(&self) -> &'static CsvSchema {
        match self {
            ImportKind::Events => &EVENTS,
            ImportKind::EventClasses => &EVENT_CLASSES,
            ImportKind::EventClassRules => &EVENT_CLASS_RULES,
        }
    }
}

/// An import that stopped early.
///
/// `imported` rows were committed before `error` occurred and are not rolled
/// back.
#[derive(Debug, thiserror::Error)]
#[error("{error} ({imported} row(s) imported before the failure)")]
pub struct ImportFailure {
    pub imported: usize,
    pub error: Error,
}

impl ImportFailure {
    fn new(imported: usize, error: Error) -> Self {
        Self { imported, error }
    }
}

/// One data record with typed, line-aware field accessors
pub struct CsvRow<'a> {
    record: &'a StringRecord,
    schema: &'a CsvSchema,
    line: usize,
}

impl<'a> CsvRow<'a> {
    /// Field text with surrounding whitespace removed
    pub fn text(&self, index: usize) -> &'a str {
        self.record.get(index).unwrap_or("").trim()
    }

    /// Required integer id
    pub fn id(&self, index: usize) -> Result<i64> {
        let raw = self.text(index);
        raw.parse::<i64>()
            .map_err(|e| self.invalid(index, format!("{:?}: {}", raw, e)))
    }

    /// Optional decimal; an empty field is `None`
    pub fn optional_decimal(&self, index: usize) -> Result<Option<f64>> {
        let raw = self.text(index);
        if raw.is_empty() {
            return Ok(None);
        }
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(value)),
            Ok(_) => Err(self.invalid(index, format!("{:?}: not a finite number", raw))),
            Err(e) => Err(self.invalid(index, format!("{:?}: {}", raw, e))),
        }
    }

    /// Attach line context to a storage failure from the insert
    pub fn insert_error(&self, error: Error) -> Error {
        match error {
            Error::Storage(source) => Error::Insert {
                line: self.line,
                entity: self.schema.entity,
                source,
            },
            other => other,
        }
    }

    fn invalid(&self, index: usize, message: String) -> Error {
        Error::InvalidField {
            line: self.line,
            field: self.schema.header.get(index).copied().unwrap_or("field"),
            message,
        }
    }
}

/// Stream `reader` as CSV laid out per `schema`, calling `insert_row` per record.
///
/// Returns the number of rows inserted.
pub fn import_csv<R, F>(
    reader: R,
    schema: &CsvSchema,
    mut insert_row: F,
) -> std::result::Result<usize, ImportFailure>
where
    R: Read,
    F: FnMut(&CsvRow<'_>) -> Result<()>,
{
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = rdr.records();

    let header = match records.next() {
        None => return Err(ImportFailure::new(0, Error::MissingHeader)),
        Some(Err(source)) => return Err(ImportFailure::new(0, Error::Csv { line: 1, source })),
        Some(Ok(record)) => record,
    };
    check_header(schema, &header).map_err(|e| ImportFailure::new(0, e))?;

    let mut imported = 0;
    for (index, record) in records.enumerate() {
        let record = record.map_err(|source| {
            let line = source.position().map_or(index + 2, |p| p.line() as usize);
            ImportFailure::new(imported, Error::Csv { line, source })
        })?;
        let line = record.position().map_or(index + 2, |p| p.line() as usize);

        if record.len() != schema.columns() {
            return Err(ImportFailure::new(
                imported,
                Error::ColumnCount {
                    line,
                    expected: schema.columns(),
                    found: record.len(),
                },
            ));
        }

        let row = CsvRow { record: &record, schema, line };
        insert_row(&row).map_err(|e| ImportFailure::new(imported, e))?;
        imported += 1;
    }

    tracing::info!("Imported {} {} row(s)", imported, schema.entity);
    Ok(imported)
}

fn check_header(schema: &CsvSchema, header: &StringRecord) -> Result<()> {
    let found: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let field = if i == 0 { field.trim_start_matches('\u{feff}') } else { field };
            field.trim().to_string()
        })
        .collect();

    if found.iter().map(String::as_str).eq(schema.header.iter().copied()) {
        Ok(())
    } else {
        Err(Error::HeaderMismatch {
            expected: schema.header.iter().map(|s| s.to_string()).collect(),
            found,
        })
    }
}

/// Import events: `title,track_id,start_date,end_date,driver_fee,spectator_fee,url,description`
pub fn import_events<R: Read>(store: &SqliteStore, reader: R) -> std::result::Result<usize, ImportFailure> {
    import_csv(reader, &EVENTS, |row| {
        let event = NewEvent {
            title: row.text(0).to_string(),
            track_id: row.id(1)?,
            start_date: row.text(2).to_string(),
            end_date: row.text(3).to_string(),
            driver_fee: row.optional_decimal(4)?,
            spectator_fee: row.optional_decimal(5)?,
            url: row.text(6).to_string(),
            description: row.text(7).to_string(),
        };
        store.create_event(&event).map_err(|e| row.insert_error(e))?;
        Ok(())
    })
}

/// Import event classes: `event_id,name,buyin_fee`
pub fn import_event_classes<R: Read>(store: &SqliteStore, reader: R) -> std::result::Result<usize, ImportFailure> {
    import_csv(reader, &EVENT_CLASSES, |row| {
        let class = NewEventClass::new(row.id(0)?, row.text(1), row.optional_decimal(2)?);
        store.create_event_class(&class).map_err(|e| row.insert_error(e))?;
        Ok(())
    })
}

/// Import class rules: `event_class_id,rule`
pub fn import_event_class_rules<R: Read>(store: &SqliteStore, reader: R) -> std::result::Result<usize, ImportFailure> {
    import_csv(reader, &EVENT_CLASS_RULES, |row| {
        let rule = NewEventClassRule::new(row.id(0)?, row.text(1));
        store.create_event_class_rule(&rule).map_err(|e| row.insert_error(e))?;
        Ok(())
    })
}

/// Open `path` and import it as `kind`
pub fn import_file(store: &SqliteStore, kind: ImportKind, path: &Path) -> std::result::Result<usize, ImportFailure> {
    let file = File::open(path).map_err(|e| ImportFailure::new(0, Error::Io(e)))?;
    tracing::debug!("Importing {} rows from {}", kind.schema().entity, path.display());

    match kind {
        ImportKind::Events => import_events(store, file),
        ImportKind::EventClasses => import_event_classes(store, file),
        ImportKind::EventClassRules => import_event_class_rules(store, file),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::{migrated_store, store_with_track};

    const EVENTS_HEADER: &str = "title,track_id,start_date,end_date,driver_fee,spectator_fee,url,description";

    fn events_csv(rows: &[&str]) -> String {
        let mut csv = String::from(EVENTS_HEADER);
        for row in rows {
            csv.push('\n');
            csv.push_str(row);
        }
        csv.push('\n');
        csv
    }

    #[test]
    fn test_import_events() {
        let (store, track_id) = store_with_track();
        let csv = events_csv(&[
            &format!("Fall Nationals,{track_id},2025-10-03 08:00:00,2025-10-12 18:00:00,50.00,20,https://a.example,\"NHRA, fall\""),
            &format!("  Test and Tune , {track_id} ,2025-10-24 18:00:00,,,,,"),
        ]);

        let imported = import_events(&store, csv.as_bytes()).unwrap();
        assert_eq!(imported, 2);

        let events = store.list_events().unwrap();
        assert_eq!(events[0].description, "NHRA, fall");
        assert_eq!(events[0].driver_fee, Some(50.0));
        assert_eq!(events[0].spectator_fee, Some(20.0));
        assert_eq!(events[1].title, "Test and Tune");
        assert_eq!(events[1].end_date, None);
        assert_eq!(events[1].driver_fee, None);
    }

    #[test]
    fn test_header_missing_column_imports_nothing() {
        let (store, track_id) = store_with_track();
        let csv = format!(
            "title,track_id,start_date,end_date,driver_fee,spectator_fee,url\nA,{track_id},2025-01-01 00:00:00,,,,\n"
        );

        let failure = import_events(&store, csv.as_bytes()).unwrap_err();
        assert_eq!(failure.imported, 0);
        assert!(matches!(failure.error, Error::HeaderMismatch { .. }));
        assert!(store.list_events().unwrap().is_empty());
    }

    #[test]
    fn test_header_order_matters() {
        let store = migrated_store();
        let failure = import_event_classes(&store, "name,event_id,buyin_fee\n".as_bytes()).unwrap_err();
        assert!(matches!(failure.error, Error::HeaderMismatch { .. }));
    }

    #[test]
    fn test_header_tolerates_bom_and_spaces() {
        let (store, _) = store_with_track();
        let csv = "\u{feff}title, track_id ,start_date,end_date,driver_fee,spectator_fee,url,description\n";
        assert_eq!(import_events(&store, csv.as_bytes()).unwrap(), 0);
    }

    #[test]
    fn test_empty_input_has_no_header() {
        let store = migrated_store();
        let failure = import_event_class_rules(&store, "".as_bytes()).unwrap_err();
        assert_eq!(failure.imported, 0);
        assert!(matches!(failure.error, Error::MissingHeader));
    }

    #[test]
    fn test_bad_track_id_stops_after_valid_rows() {
        let (store, track_id) = store_with_track();
        let csv = events_csv(&[
            &format!("One,{track_id},2025-01-01 00:00:00,,,,,"),
            &format!("Two,{track_id},2025-01-02 00:00:00,,,,,"),
            "Three,abc,2025-01-03 00:00:00,,,,,",
            &format!("Four,{track_id},2025-01-04 00:00:00,,,,,"),
        ]);

        let failure = import_events(&store, csv.as_bytes()).unwrap_err();
        assert_eq!(failure.imported, 2);
        match &failure.error {
            Error::InvalidField { line, field, .. } => {
                assert_eq!(*line, 4);
                assert_eq!(*field, "track_id");
            }
            other => panic!("unexpected error: {other}"),
        }
        // Committed rows stay
        assert_eq!(store.list_events().unwrap().len(), 2);
    }

    #[test]
    fn test_bad_fee_reports_field() {
        let (store, track_id) = store_with_track();
        let csv = events_csv(&[&format!("One,{track_id},2025-01-01 00:00:00,,12,abc,,")]);

        let failure = import_events(&store, csv.as_bytes()).unwrap_err();
        assert_eq!(failure.imported, 0);
        let message = failure.error.to_string();
        assert!(message.contains("line 2"), "{message}");
        assert!(message.contains("spectator_fee"), "{message}");
    }

    #[test]
    fn test_non_finite_fee_rejected() {
        let (store, track_id) = store_with_track();
        let csv = events_csv(&[&format!("One,{track_id},2025-01-01 00:00:00,,NaN,,,")]);
        let failure = import_events(&store, csv.as_bytes()).unwrap_err();
        assert!(matches!(failure.error, Error::InvalidField { field: "driver_fee", .. }));
    }

    #[test]
    fn test_wrong_column_count() {
        let (store, track_id) = store_with_track();
        let csv = events_csv(&[
            &format!("One,{track_id},2025-01-01 00:00:00,,,,,"),
            &format!("Two,{track_id},2025-01-02 00:00:00"),
        ]);

        let failure = import_events(&store, csv.as_bytes()).unwrap_err();
        assert_eq!(failure.imported, 1);
        match failure.error {
            Error::ColumnCount { line, expected, found } => {
                assert_eq!((line, expected, found), (3, 8, 3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_error_line_is_file_line() {
        let (store, track_id) = store_with_track();
        let csv = format!(
            "{EVENTS_HEADER}\nOne,{track_id},2025-01-01 00:00:00,,,,,\"first line\nsecond line\"\nBad,abc,2025-01-02 00:00:00,,,,,\n"
        );

        let failure = import_events(&store, csv.as_bytes()).unwrap_err();
        assert_eq!(failure.imported, 1);
        assert!(matches!(failure.error, Error::InvalidField { line: 4, field: "track_id", .. }));
        assert_eq!(store.list_events().unwrap()[0].description, "first line\nsecond line");
    }

    #[test]
    fn test_foreign_key_violation_is_insert_error() {
        let (store, track_id) = store_with_track();
        let csv = events_csv(&[
            &format!("One,{track_id},2025-01-01 00:00:00,,,,,"),
            "Orphan,999,2025-01-02 00:00:00,,,,,",
        ]);

        let failure = import_events(&store, csv.as_bytes()).unwrap_err();
        assert_eq!(failure.imported, 1);
        assert!(matches!(failure.error, Error::Insert { line: 3, entity: "event", .. }));
    }

    #[test]
    fn test_import_classes_and_rules() {
        let (store, track_id) = store_with_track();
        let csv = events_csv(&[&format!("One,{track_id},2025-01-01 00:00:00,,,,,")]);
        import_events(&store, csv.as_bytes()).unwrap();
        let event_id = store.list_events().unwrap()[0].id;

        let classes = format!("event_id,name,buyin_fee\n{event_id},Pro Street,100\n{event_id},Test & Tune,\n");
        assert_eq!(import_event_classes(&store, classes.as_bytes()).unwrap(), 2);

        let listed = store.list_event_classes().unwrap();
        assert_eq!(listed[0].buyin_fee, Some(100.0));
        assert_eq!(listed[1].buyin_fee, None);

        let rules = format!(
            "event_class_id,rule\n{},DOT street tires only\n{},\"Maximum 10.5\"\" tire width\"\n",
            listed[0].id, listed[0].id
        );
        assert_eq!(import_event_class_rules(&store, rules.as_bytes()).unwrap(), 2);

        let listed_rules = store.list_event_class_rules().unwrap();
        assert_eq!(listed_rules[1].rule, "Maximum 10.5\" tire width");
    }

    #[test]
    fn test_import_file() {
        let (store, track_id) = store_with_track();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.csv");
        std::fs::write(&path, events_csv(&[&format!("One,{track_id},2025-01-01 00:00:00,,,,,")])).unwrap();

        assert_eq!(import_file(&store, ImportKind::Events, &path).unwrap(), 1);

        let missing = import_file(&store, ImportKind::Events, &dir.path().join("nope.csv")).unwrap_err();
        assert_eq!(missing.imported, 0);
        assert!(matches!(missing.error, Error::Io(_)));
    }

    #[test]
    fn test_schema_columns() {
        assert_eq!(ImportKind::Events.schema().columns(), 8);
        assert_eq!(ImportKind::EventClasses.schema().columns(), 3);
        assert_eq!(ImportKind::EventClassRules.schema().columns(), 2);
    }
}
