//! Sample calendar data for local development

use super::SqliteStore;
use crate::Result;
use crate::model::{NewEvent, NewEventClass, NewEventClassRule, NewTrack};

/// Rows inserted by [`SqliteStore::seed`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub tracks: usize,
    pub events: usize,
    pub classes: usize,
    pub rules: usize,
}

impl std::fmt::Display for SeedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} tracks, {} events, {} classes, {} rules",
            self.tracks, self.events, self.classes, self.rules
        )
    }
}

impl SqliteStore {
    /// Insert two tracks, two events, three classes and seven rules
    pub fn seed(&self) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        let motorplex = self.create_track(&NewTrack::new(
            "Texas Motorplex",
            "Ennis",
            "7500 US-287, Ennis, TX",
            "https://texasmotorplex.com",
        ))?;
        let xrp = self.create_track(&NewTrack::new(
            "Xtreme Raceway Park",
            "Ferris",
            "1800 S Interstate 45, Ferris, TX",
            "https://www.xtremeracewaypark.com",
        ))?;
        report.tracks = 2;

        let nationals = self.create_event(
            &NewEvent::new("Fall Nationals", motorplex, "2025-10-03 08:00:00")
                .with_end_date("2025-10-12 18:00:00")
                .with_fees(Some(50.0), Some(20.0))
                .with_url("https://texasmotorplex.com/events")
                .with_description("NHRA fall event"),
        )?;
        let drags = self.create_event(
            &NewEvent::new("Friday Night Drags", xrp, "2025-10-24 18:00:00")
                .with_end_date("2025-10-24 23:00:00")
                .with_fees(Some(30.0), Some(10.0))
                .with_url("https://www.xtremeracewaypark.com")
                .with_description("Test and tune night"),
        )?;
        report.events = 2;

        let classes: [(i64, &str, Option<f64>, &[&str]); 3] = [
            (
                nationals,
                "Pro Street",
                Some(100.0),
                &["DOT street tires only", "Maximum 10.5\" tire width", "Full interior required"],
            ),
            (
                nationals,
                "Street",
                Some(50.0),
                &["Street legal vehicle", "Valid registration and insurance"],
            ),
            (
                drags,
                "Test & Tune",
                None,
                &["All vehicles welcome", "Helmet required for sub-14 second runs"],
            ),
        ];

        for (event_id, name, buyin_fee, rules) in classes {
            let class_id = self.create_event_class(&NewEventClass::new(event_id, name, buyin_fee))?;
            report.classes += 1;
            for rule in rules {
                self.create_event_class_rule(&NewEventClassRule::new(class_id, *rule))?;
                report.rules += 1;
            }
        }

        tracing::info!("Seeded {}", report);
        Ok(report)
    }
}
