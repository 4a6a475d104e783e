use dragevents::config::Settings;
use dragevents::model::NewTrack;
use dragevents::output::is_quiet;
use dragevents::ui::{
    dim, event_block, header, info, muted, section, stats_table, status, success, summary_row,
    tracks_table, warn, Icons, Spinner,
};
use dragevents::{export, import, prompt, ImportKind, SqliteStore};
use std::path::Path;

fn open_store(settings: &Settings) -> anyhow::Result<SqliteStore> {
    Ok(SqliteStore::open(&settings.database)?)
}

fn banner(title: &str, settings: &Settings) {
    if is_quiet() {
        return;
    }
    header(title);
    status(Icons::DATABASE, "Database", &settings.database.display().to_string());
}

pub fn run_db_init(settings: &Settings) -> anyhow::Result<()> {
    banner("Applying migrations", settings);
    let store = open_store(settings)?;
    let applied = store.migrate(&settings.migrations)?;

    for script in &applied {
        summary_row(Icons::FILE, script);
    }
    success(&format!(
        "Applied {} migration(s) from {}",
        applied.len(),
        settings.migrations.display()
    ));
    Ok(())
}

pub fn run_db_seed(settings: &Settings) -> anyhow::Result<()> {
    banner("Seeding sample data", settings);
    let store = open_store(settings)?;
    let report = store.seed()?;
    success(&format!("Seed data inserted: {}", report));
    Ok(())
}

pub fn run_db_status(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let stats = store.stats()?;

    banner("Database status", settings);
    println!("{}", stats_table(&stats));
    Ok(())
}

pub fn run_track_add(
    settings: &Settings,
    name: &str,
    city: &str,
    address: &str,
    url: &str,
) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let id = store.create_track(&NewTrack::new(name, city, address, url))?;
    success(&format!("Track created, ID: {}", id));
    Ok(())
}

pub fn run_track_list(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let tracks = store.list_tracks()?;

    if tracks.is_empty() {
        println!("{}", muted("No tracks found."));
        return Ok(());
    }
    println!("{}", tracks_table(&tracks));
    println!("{}", dim(&format!("Total: {} tracks", tracks.len())));
    Ok(())
}

pub fn run_event_add(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;

    section("Add New Event");
    let stdin = std::io::stdin();
    let event = prompt::read_new_event(stdin.lock(), std::io::stdout())?;
    let id = store.create_event(&event)?;

    println!();
    success(&format!("Event created, ID: {}", id));
    info("Next", "run `dragevents export` to regenerate the JSON files");
    Ok(())
}

pub fn run_event_list(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let events = store.list_events()?;

    if events.is_empty() {
        println!("{}", muted("No events found."));
        return Ok(());
    }

    section("Events");
    println!();
    for event in &events {
        if event.has_unparsed_dates() {
            tracing::warn!("Event {} has an unparsable date", event.id);
        }
        event_block(event);
    }
    println!("{}", dim(&format!("Total: {} events", events.len())));
    Ok(())
}

pub fn run_event_delete(settings: &Settings, id: i64) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let report = store.delete_event(id)?;

    if report.found() {
        success(&format!("Event {} deleted ({})", id, report));
    } else {
        warn(&format!("Event {} not found; nothing deleted", id));
    }
    info("Next", "run `dragevents export` to update the JSON files");
    Ok(())
}

pub fn run_import(settings: &Settings, kind: ImportKind, path: &Path) -> anyhow::Result<()> {
    let store = open_store(settings)?;
    let entity = kind.schema().entity;

    let spinner = Spinner::new(&format!("Importing {} rows from {}", entity, path.display()));
    let result = import::import_file(&store, kind, path);
    spinner.finish_and_clear();

    let imported = result?;
    success(&format!("Imported {} {} row(s) from {}", imported, entity, path.display()));
    Ok(())
}

pub fn run_export(settings: &Settings) -> anyhow::Result<()> {
    let store = open_store(settings)?;

    let spinner = Spinner::new("Collecting tables");
    let snapshot = export::collect(&store)?;
    spinner.set_message(&format!("Writing {}", settings.export_dir.display()));
    let summary = export::write_snapshot(&settings.export_dir, &snapshot)?;
    spinner.finish_and_clear();

    success(&format!("Exported JSON to {}", settings.export_dir.display()));
    summary_row(Icons::PIN, &format!("{} tracks", summary.tracks));
    summary_row(
        Icons::CALENDAR,
        &format!(
            "{} events, {} classes, {} rules",
            summary.events, summary.classes, summary.rules
        ),
    );
    if summary.unparsed_dates > 0 {
        warn(&format!(
            "{} event(s) had unparsable dates and were exported with the default instant",
            summary.unparsed_dates
        ));
    }
    Ok(())
}
