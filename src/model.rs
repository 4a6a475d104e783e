//! Calendar records - tracks, events, classes and class rules
//!
//! The read-side structs mirror rows of the four tables and serialize to the
//! JSON shape consumed by the static site. Optional columns are `Option`s and
//! are omitted from the JSON when absent; nested lists are omitted when empty.
//!
//! The `New*` structs are insert payloads without ids.

use crate::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// A venue hosting events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub url: String,
}

/// A scheduled event at a track, joined with the track's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub track_id: i64,
    pub track_name: String,
    pub start_date: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Timestamp>,
    #[serde(rename = "event_driver_fee", default, skip_serializing_if = "Option::is_none")]
    pub driver_fee: Option<f64>,
    #[serde(rename = "event_spectator_fee", default, skip_serializing_if = "Option::is_none")]
    pub spectator_fee: Option<f64>,
    pub url: String,
    pub description: String,
    /// Filled in by the exporter; empty straight out of the repository
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<EventClass>,
}

impl Event {
    /// True if either stored timestamp fell back to the default instant
    pub fn has_unparsed_dates(&self) -> bool {
        self.start_date.is_fallback()
            || self.end_date.as_ref().is_some_and(Timestamp::is_fallback)
    }
}

/// A competition category within an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventClass {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buyin_fee: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<EventClassRule>,
}

/// A textual rule attached to a class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventClassRule {
    pub id: i64,
    pub event_class_id: i64,
    pub rule: String,
}

/// Insert payload for a track
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTrack {
    pub name: String,
    pub city: String,
    pub address: String,
    pub url: String,
}

impl NewTrack {
    pub fn new(
        name: impl Into<String>,
        city: impl Into<String>,
        address: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            address: address.into(),
            url: url.into(),
        }
    }
}

/// Insert payload for an event.
///
/// `start_date` and `end_date` are stored as given. An empty `end_date`
/// means the event has no end date and is written as NULL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub track_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub driver_fee: Option<f64>,
    pub spectator_fee: Option<f64>,
    pub url: String,
    pub description: String,
}

impl NewEvent {
    /// Event with the required fields set and everything optional left empty
    pub fn new(title: impl Into<String>, track_id: i64, start_date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            track_id,
            start_date: start_date.into(),
            ..Default::default()
        }
    }

    pub fn with_end_date(mut self, end_date: impl Into<String>) -> Self {
        self.end_date = end_date.into();
        self
    }

    pub fn with_fees(mut self, driver_fee: Option<f64>, spectator_fee: Option<f64>) -> Self {
        self.driver_fee = driver_fee;
        self.spectator_fee = spectator_fee;
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Insert payload for an event class
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventClass {
    pub event_id: i64,
    pub name: String,
    pub buyin_fee: Option<f64>,
}

impl NewEventClass {
    pub fn new(event_id: i64, name: impl Into<String>, buyin_fee: Option<f64>) -> Self {
        Self {
            event_id,
            name: name.into(),
            buyin_fee,
        }
    }
}

/// Insert payload for a class rule
#[derive(Debug, Clone, PartialEq)]
pub struct NewEventClassRule {
    pub event_class_id: i64,
    pub rule: String,
}

impl NewEventClassRule {
    pub fn new(event_class_id: i64, rule: impl Into<String>) -> Self {
        Self {
            event_class_id,
            rule: rule.into(),
        }
    }
}
