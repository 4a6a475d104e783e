//! Dragevents CLI - maintain the drag racing calendar database and export it

use clap::{Parser, Subcommand};
use dragevents::config::{self, Settings};
use dragevents::ImportKind;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "dragevents")]
#[command(version)]
#[command(about = "Drag racing event calendar - SQLite store, CSV import and JSON export")]
#[command(long_about = r#"
Dragevents keeps tracks, events, classes and class rules in SQLite and
publishes them as JSON for the static site.

Example usage:
  dragevents db init
  dragevents event import events.csv
  dragevents export --out ../site/data
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to ./dragevents.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database setup and inspection
    Db {
        #[command(subcommand)]
        action: DbAction,
    },

    /// Manage tracks
    Track {
        #[command(subcommand)]
        action: TrackAction,
    },

    /// Manage events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Manage event classes
    Class {
        #[command(subcommand)]
        action: ImportAction,
    },

    /// Manage event class rules
    Rule {
        #[command(subcommand)]
        action: ImportAction,
    },

    /// Write tracks.json and events.json
    Export {
        /// Output directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// Apply the migration scripts
    Init {
        /// Directory holding the *.sql scripts
        #[arg(short, long)]
        migrations: Option<PathBuf>,
    },

    /// Insert sample data
    Seed,

    /// Show row counts per table
    Status,
}

#[derive(Subcommand)]
enum TrackAction {
    /// Add a track
    Add {
        /// Track name
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        city: String,

        #[arg(long, default_value = "")]
        address: String,

        #[arg(long, default_value = "")]
        url: String,
    },

    /// List all tracks
    List,
}

#[derive(Subcommand)]
enum EventAction {
    /// Interactively add an event
    Add,

    /// List all events by start date
    List,

    /// Delete an event with its classes and rules
    Delete {
        /// Event ID
        id: i64,
    },

    /// Import events from CSV
    Import {
        /// CSV file with header title,track_id,start_date,end_date,driver_fee,spectator_fee,url,description
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum ImportAction {
    /// Import rows from CSV
    Import {
        /// CSV file with the matching header
        file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?;
    let (migrations, export_dir) = match &cli.command {
        Commands::Db {
            action: DbAction::Init { migrations },
        } => (migrations.clone(), None),
        Commands::Export { out } => (None, out.clone()),
        _ => (None, None),
    };
    let settings = Settings::resolve(file_config.as_ref(), cli.database, migrations, export_dir);
    tracing::debug!("Using database {}", settings.database.display());

    match cli.command {
        Commands::Db { action } => match action {
            DbAction::Init { .. } => commands::run_db_init(&settings)?,
            DbAction::Seed => commands::run_db_seed(&settings)?,
            DbAction::Status => commands::run_db_status(&settings)?,
        },

        Commands::Track { action } => match action {
            TrackAction::Add {
                name,
                city,
                address,
                url,
            } => commands::run_track_add(&settings, &name, &city, &address, &url)?,
            TrackAction::List => commands::run_track_list(&settings)?,
        },

        Commands::Event { action } => match action {
            EventAction::Add => commands::run_event_add(&settings)?,
            EventAction::List => commands::run_event_list(&settings)?,
            EventAction::Delete { id } => commands::run_event_delete(&settings, id)?,
            EventAction::Import { file } => {
                commands::run_import(&settings, ImportKind::Events, &file)?
            }
        },

        Commands::Class {
            action: ImportAction::Import { file },
        } => commands::run_import(&settings, ImportKind::EventClasses, &file)?,

        Commands::Rule {
            action: ImportAction::Import { file },
        } => commands::run_import(&settings, ImportKind::EventClassRules, &file)?,

        Commands::Export { .. } => commands::run_export(&settings)?,
    }

    Ok(())
}
