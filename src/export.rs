//! JSON export - nested snapshot for the static site
//!
//! The repository returns flat, ordered rows. The exporter groups rules under
//! their class and classes under their event, then writes:
//!
//! - `tracks.json`: array of tracks
//! - `events.json`: array of events, each with `classes[].rules[]`
//!
//! Both files are pretty-printed with a trailing newline. Empty `classes` and
//! `rules` lists are left out of the JSON, as are absent optional fields.

use crate::model::{Event, EventClass, EventClassRule, Track};
use crate::storage::SqliteStore;
use crate::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const TRACKS_FILE: &str = "tracks.json";
pub const EVENTS_FILE: &str = "events.json";

/// Default export directory, relative to the working directory
pub const DEFAULT_EXPORT_DIR: &str = "../site/data";

/// Tracks and fully nested events, ready to write
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub tracks: Vec<Track>,
    pub events: Vec<Event>,
}

impl Snapshot {
    pub fn class_count(&self) -> usize {
        self.events.iter().map(|e| e.classes.len()).sum()
    }

    pub fn rule_count(&self) -> usize {
        self.events
            .iter()
            .flat_map(|e| &e.classes)
            .map(|c| c.rules.len())
            .sum()
    }

    /// Events with a start or end timestamp that did not parse
    pub fn unparsed_event_ids(&self) -> Vec<i64> {
        self.events
            .iter()
            .filter(|e| e.has_unparsed_dates())
            .map(|e| e.id)
            .collect()
    }
}

/// What an export wrote
#[derive(Debug, Clone, PartialEq)]
pub struct ExportSummary {
    pub tracks: usize,
    pub events: usize,
    pub classes: usize,
    pub rules: usize,
    pub unparsed_dates: usize,
    pub tracks_path: PathBuf,
    pub events_path: PathBuf,
}

/// Nest rules into classes and classes into events.
///
/// Input order is kept within each group. Rows whose parent is missing are
/// dropped with a warning.
pub fn assemble(
    tracks: Vec<Track>,
    mut events: Vec<Event>,
    mut classes: Vec<EventClass>,
    rules: Vec<EventClassRule>,
) -> Snapshot {
    let mut rules_by_class: HashMap<i64, Vec<EventClassRule>> = HashMap::new();
    for rule in rules {
        rules_by_class.entry(rule.event_class_id).or_default().push(rule);
    }
    for class in &mut classes {
        class.rules = rules_by_class.remove(&class.id).unwrap_or_default();
    }

    let mut classes_by_event: HashMap<i64, Vec<EventClass>> = HashMap::new();
    for class in classes {
        classes_by_event.entry(class.event_id).or_default().push(class);
    }
    for event in &mut events {
        event.classes = classes_by_event.remove(&event.id).unwrap_or_default();
    }

    let orphan_rules: usize = rules_by_class.values().map(Vec::len).sum();
    let orphan_classes: usize = classes_by_event.values().map(Vec::len).sum();
    if orphan_rules > 0 || orphan_classes > 0 {
        tracing::warn!(
            "Skipping {} class(es) and {} rule(s) whose parent row is missing",
            orphan_classes,
            orphan_rules
        );
    }

    Snapshot { tracks, events }
}

/// Read all four tables and nest them
pub fn collect(store: &SqliteStore) -> Result<Snapshot> {
    let tracks = store.list_tracks()?;
    let events = store.list_events()?;
    let classes = store.list_event_classes()?;
    let rules = store.list_event_class_rules()?;

    tracing::debug!(
        "Loaded {} tracks, {} events, {} classes, {} rules",
        tracks.len(),
        events.len(),
        classes.len(),
        rules.len()
    );
    Ok(assemble(tracks, events, classes, rules))
}

/// Serialize `value` as pretty JSON with a trailing newline
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut bytes = serde_json::to_vec_pretty(value)?;
    bytes.push(b'\n');
    std::fs::write(path, bytes).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `tracks.json` and `events.json` into `dir`, creating it if needed
pub fn write_snapshot(dir: &Path, snapshot: &Snapshot) -> Result<ExportSummary> {
    std::fs::create_dir_all(dir).map_err(|source| Error::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let unparsed = snapshot.unparsed_event_ids();
    for id in &unparsed {
        tracing::warn!("Event {} has an unparsable date; exporting the default instant", id);
    }

    let tracks_path = dir.join(TRACKS_FILE);
    let events_path = dir.join(EVENTS_FILE);
    write_json(&tracks_path, &snapshot.tracks)?;
    write_json(&events_path, &snapshot.events)?;

    let summary = ExportSummary {
        tracks: snapshot.tracks.len(),
        events: snapshot.events.len(),
        classes: snapshot.class_count(),
        rules: snapshot.rule_count(),
        unparsed_dates: unparsed.len(),
        tracks_path,
        events_path,
    };
    tracing::info!(
        "Exported {} tracks and {} events to {}",
        summary.tracks,
        summary.events,
        dir.display()
    );
    Ok(summary)
}

/// Collect from `store` and write the snapshot into `dir`
pub fn export_all(store: &SqliteStore, dir: &Path) -> Result<ExportSummary> {
    let snapshot = collect(store)?;
    write_snapshot(dir, &snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewEvent, NewEventClass, NewEventClassRule};
    use crate::storage::test_support::{migrated_store, store_with_track};
    use crate::timestamp::Timestamp;
    use serde_json::Value;

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    fn event(id: i64) -> Event {
        Event {
            id,
            title: format!("Event {id}"),
            track_id: 1,
            track_name: "Track".to_string(),
            start_date: Timestamp::parse("2025-01-01 00:00:00"),
            end_date: None,
            driver_fee: None,
            spectator_fee: None,
            url: String::new(),
            description: String::new(),
            classes: Vec::new(),
        }
    }

    fn class(id: i64, event_id: i64) -> EventClass {
        EventClass { id, event_id, name: format!("Class {id}"), buyin_fee: None, rules: Vec::new() }
    }

    fn rule(id: i64, event_class_id: i64) -> EventClassRule {
        EventClassRule { id, event_class_id, rule: format!("Rule {id}") }
    }

    #[test]
    fn test_assemble_nests_in_order() {
        let snapshot = assemble(
            Vec::new(),
            vec![event(1), event(2), event(3)],
            vec![class(10, 1), class(11, 1), class(20, 2)],
            vec![rule(100, 10), rule(101, 10), rule(102, 11), rule(200, 20)],
        );

        let ev1 = &snapshot.events[0];
        assert_eq!(ev1.classes.iter().map(|c| c.id).collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(ev1.classes[0].rules.iter().map(|r| r.id).collect::<Vec<_>>(), vec![100, 101]);
        assert_eq!(ev1.classes[1].rules.len(), 1);
        assert_eq!(snapshot.events[1].classes[0].rules[0].id, 200);
        assert!(snapshot.events[2].classes.is_empty());
        assert_eq!(snapshot.class_count(), 3);
        assert_eq!(snapshot.rule_count(), 4);
    }

    #[test]
    fn test_assemble_drops_orphans() {
        let snapshot = assemble(
            Vec::new(),
            vec![event(1)],
            vec![class(10, 1), class(99, 42)],
            vec![rule(100, 10), rule(999, 77)],
        );
        assert_eq!(snapshot.class_count(), 1);
        assert_eq!(snapshot.rule_count(), 1);
    }

    #[test]
    fn test_export_counts_match_store() {
        let store = migrated_store();
        store.seed().unwrap();
        let dir = tempfile::tempdir().unwrap();

        let summary = export_all(&store, dir.path()).unwrap();
        assert_eq!((summary.tracks, summary.events, summary.classes, summary.rules), (2, 2, 3, 7));
        assert_eq!(summary.unparsed_dates, 0);

        let tracks = read_json(&dir.path().join(TRACKS_FILE));
        assert_eq!(tracks.as_array().unwrap().len(), 2);
        assert_eq!(tracks[0]["name"], "Texas Motorplex");

        let events = read_json(&dir.path().join(EVENTS_FILE));
        let events = events.as_array().unwrap();
        assert_eq!(events.len(), 2);

        let nationals = &events[0];
        assert_eq!(nationals["start_date"], "2025-10-03T08:00:00Z");
        assert_eq!(nationals["end_date"], "2025-10-12T18:00:00Z");
        assert_eq!(nationals["event_driver_fee"], 50.0);
        let classes = nationals["classes"].as_array().unwrap();
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0]["rules"].as_array().unwrap().len(), 3);
        assert_eq!(classes[1]["rules"].as_array().unwrap().len(), 2);

        let drags = &events[1];
        let tune = &drags["classes"][0];
        assert_eq!(tune["name"], "Test & Tune");
        assert!(tune.get("buyin_fee").is_none());
        assert_eq!(tune["rules"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_export_omits_empty_lists_and_absent_fields() {
        let (store, track_id) = store_with_track();
        let event_id = store
            .create_event(&NewEvent::new("Bare", track_id, "2025-05-01 09:00:00"))
            .unwrap();
        store.create_event_class(&NewEventClass::new(event_id, "No Rules", Some(0.0))).unwrap();
        store
            .create_event(&NewEvent::new("No Classes", track_id, "2025-06-01 09:00:00"))
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        export_all(&store, dir.path()).unwrap();
        let events = read_json(&dir.path().join(EVENTS_FILE));

        let bare = events[0].as_object().unwrap();
        assert!(!bare.contains_key("end_date"));
        assert!(!bare.contains_key("event_driver_fee"));
        let class = bare["classes"][0].as_object().unwrap();
        assert_eq!(class["buyin_fee"], 0.0);
        assert!(!class.contains_key("rules"));

        assert!(!events[1].as_object().unwrap().contains_key("classes"));
    }

    #[test]
    fn test_export_is_pretty_with_trailing_newline() {
        let store = migrated_store();
        let dir = tempfile::tempdir().unwrap();
        export_all(&store, dir.path()).unwrap();

        let tracks = std::fs::read_to_string(dir.path().join(TRACKS_FILE)).unwrap();
        assert_eq!(tracks, "[]\n");

        store.seed().unwrap();
        export_all(&store, dir.path()).unwrap();
        let events = std::fs::read_to_string(dir.path().join(EVENTS_FILE)).unwrap();
        assert!(events.ends_with("]\n"));
        assert!(events.contains("\n  {\n    \"id\": "));
    }

    #[test]
    fn test_export_is_deterministic() {
        let store = migrated_store();
        store.seed().unwrap();
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        export_all(&store, first.path()).unwrap();
        export_all(&store, second.path()).unwrap();

        for file in [TRACKS_FILE, EVENTS_FILE] {
            assert_eq!(
                std::fs::read(first.path().join(file)).unwrap(),
                std::fs::read(second.path().join(file)).unwrap()
            );
        }
    }

    #[test]
    fn test_export_creates_nested_dir_and_tolerates_existing() {
        let store = migrated_store();
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("site").join("data");

        export_all(&store, &target).unwrap();
        export_all(&store, &target).unwrap();
        assert!(target.join(TRACKS_FILE).is_file());
        assert!(target.join(EVENTS_FILE).is_file());
    }

    #[test]
    fn test_write_failure_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(EVENTS_FILE)).unwrap();

        let err = write_snapshot(dir.path(), &Snapshot::default()).unwrap_err();
        assert!(err.to_string().contains(EVENTS_FILE), "{err}");
    }

    #[test]
    fn test_unparsed_dates_are_counted() {
        let (store, track_id) = store_with_track();
        store.create_event(&NewEvent::new("TBD", track_id, "spring")).unwrap();
        let known = store
            .create_event(&NewEvent::new("Known", track_id, "2025-04-01 10:00:00"))
            .unwrap();
        let class_id = store.create_event_class(&NewEventClass::new(known, "Open", None)).unwrap();
        store.create_event_class_rule(&NewEventClassRule::new(class_id, "Helmets")).unwrap();
        let dir = tempfile::tempdir().unwrap();

        let summary = export_all(&store, dir.path()).unwrap();
        assert_eq!(summary.unparsed_dates, 1);

        let events = read_json(&dir.path().join(EVENTS_FILE));
        assert_eq!(events[0]["title"], "TBD");
        assert_eq!(events[0]["start_date"], "1970-01-01T00:00:00Z");
    }
}
