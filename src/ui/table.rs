use crate::model::Track;
use crate::storage::DbStats;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub metric: String,
    #[tabled(rename = "Rows")]
    pub value: String,
}

#[derive(Tabled)]
struct TrackRow<'a> {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: &'a str,
    #[tabled(rename = "City")]
    city: &'a str,
    #[tabled(rename = "Address")]
    address: &'a str,
    #[tabled(rename = "URL")]
    url: &'a str,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

/// Row counts for `db status`
pub fn stats_table(stats: &DbStats) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("tracks", &stats.tracks.to_string());
    builder.add_row("events", &stats.events.to_string());
    builder.add_row("event_classes", &stats.classes.to_string());
    builder.add_row("event_class_rules", &stats.rules.to_string());
    builder.build()
}

pub fn tracks_table(tracks: &[Track]) -> String {
    if tracks.is_empty() {
        return String::new();
    }
    let rows: Vec<TrackRow<'_>> = tracks
        .iter()
        .map(|t| TrackRow {
            id: t.id,
            name: &t.name,
            city: &t.city,
            address: &t.address,
            url: &t.url,
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
