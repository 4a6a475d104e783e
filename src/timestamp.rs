//! Event timestamps - best-effort parsing of stored date/time text
//!
//! SQLite hands `DATETIME` columns back as whatever text was written, so a
//! value may come in several shapes. Parsing tries each known layout in order
//! and keeps the first hit:
//!
//! 1. `2025-10-03 08:00:00.5-05:00` (space separator, fraction, offset)
//! 2. `2025-10-03 08:00:00.5` (space separator, fraction, UTC)
//! 3. `2025-10-03 08:00:00`
//! 4. `2025-10-03T08:00:00Z` / `2025-10-03T08:00:00.5+02:00` (RFC 3339)
//! 5. `2025-10-03T08:00:00` (no zone, UTC)
//! 6. `2025-10-03 08:00:00Z`
//!
//! Text matching none of these is kept as [`Timestamp::Unparsed`] so callers
//! can tell a real instant from the fallback.

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Layouts with an explicit offset.
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z"];

/// Layouts without an offset, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

/// Checked after RFC 3339.
const NAIVE_FALLBACK_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%SZ"];

/// Display layout used by the CLI listing.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Appended to the raw text of an unparsed value in [`Timestamp::display`].
pub const UNPARSED_SUFFIX: &str = " (unparsed)";

/// A stored date/time, either parsed or kept verbatim when no layout matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timestamp {
    /// Successfully parsed instant
    Parsed(DateTime<FixedOffset>),
    /// Raw text that matched no known layout
    Unparsed(String),
}

impl Timestamp {
    /// Parse stored text, trying every supported layout in order
    pub fn parse(raw: &str) -> Self {
        let text = raw.trim();

        for format in ZONED_FORMATS {
            if let Ok(ts) = DateTime::parse_from_str(text, format) {
                return Timestamp::Parsed(ts);
            }
        }

        if let Some(ts) = parse_naive(text, NAIVE_FORMATS) {
            return Timestamp::Parsed(ts);
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Timestamp::Parsed(ts);
        }

        if let Some(ts) = parse_naive(text, NAIVE_FALLBACK_FORMATS) {
            return Timestamp::Parsed(ts);
        }

        Timestamp::Unparsed(raw.to_string())
    }

    /// True when no layout matched and [`value`](Self::value) is the default instant
    pub fn is_fallback(&self) -> bool {
        matches!(self, Timestamp::Unparsed(_))
    }

    /// The parsed instant, or the default (Unix epoch) for unparsed text
    pub fn value(&self) -> DateTime<FixedOffset> {
        match self {
            Timestamp::Parsed(ts) => *ts,
            Timestamp::Unparsed(_) => DateTime::<FixedOffset>::default(),
        }
    }

    /// RFC 3339 form of [`value`](Self::value), `Z` for UTC
    pub fn to_rfc3339(&self) -> String {
        self.value().to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    /// Human-readable form for terminal output
    pub fn display(&self) -> String {
        match self {
            Timestamp::Parsed(ts) => ts.format(DISPLAY_FORMAT).to_string(),
            Timestamp::Unparsed(raw) => format!("{}{}", raw, UNPARSED_SUFFIX),
        }
    }
}

fn parse_naive(text: &str, formats: &[&str]) -> Option<DateTime<FixedOffset>> {
    formats.iter().find_map(|format| {
        NaiveDateTime::parse_from_str(text, format)
            .ok()
            .map(|naive| naive.and_utc().fixed_offset())
    })
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Parsed(_) => write!(f, "{}", self.to_rfc3339()),
            Timestamp::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}

impl Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Timestamp::parse(&s))
    }
}
