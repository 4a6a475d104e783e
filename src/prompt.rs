//! Interactive event entry
//!
//! Reads one event from a line-oriented input, writing the prompts to
//! `output`. Optional answers may be left blank; a blank end date becomes the
//! empty-string "no end date" value understood by
//! [`SqliteStore::create_event`](crate::SqliteStore::create_event).

use crate::model::NewEvent;
use crate::{Error, Result};
use std::io::{BufRead, Write};

struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    fn ask(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    fn required(&mut self, label: &str, what: &str) -> Result<String> {
        let answer = self.ask(label)?;
        if answer.is_empty() {
            return Err(Error::InvalidInput(format!("{} is required", what)));
        }
        Ok(answer)
    }

    fn optional_decimal(&mut self, label: &str, what: &str) -> Result<Option<f64>> {
        let answer = self.ask(label)?;
        if answer.is_empty() {
            return Ok(None);
        }
        answer
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| Error::InvalidInput(format!("invalid {}: {:?}", what, answer)))
    }
}

/// Prompt for every event field and return the insert payload
pub fn read_new_event<R: BufRead, W: Write>(input: R, output: W) -> Result<NewEvent> {
    let mut p = Prompter { input, output };

    let title = p.required("Title", "title")?;

    let track = p.required("Track ID", "track ID")?;
    let track_id = track
        .parse::<i64>()
        .map_err(|e| Error::InvalidInput(format!("invalid track ID {:?}: {}", track, e)))?;

    let start_date = p.required("Start Date (YYYY-MM-DD HH:MM:SS)", "start date")?;
    let end_date = p.ask("End Date (YYYY-MM-DD HH:MM:SS) [optional, press Enter to skip]")?;
    let driver_fee = p.optional_decimal("Driver Fee [optional, press Enter to skip]", "driver fee")?;
    let spectator_fee =
        p.optional_decimal("Spectator Fee [optional, press Enter to skip]", "spectator fee")?;
    let url = p.ask("URL")?;
    let description = p.ask("Description")?;

    Ok(NewEvent {
        title,
        track_id,
        start_date,
        end_date,
        driver_fee,
        spectator_fee,
        url,
        description,
    })
}
