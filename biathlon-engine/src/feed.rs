//! Event log parser
//!
//! Turns the textual event log into [`Event`]s. Every line has the shape
//!
//! ```text
//! [HH:MM:SS.mmm] <actionCode> <competitorId> [extra...]
//! ```
//!
//! The engine assumes well-formed events, so any invalid line aborts the
//! whole batch before processing starts.

use crate::timing::parse_timestamp;
use crate::types::{Action, CompetitorId, EngineError, Event, Result};
use std::io::BufRead;

/// Parse a single event line
pub fn parse_event_line(line: &str) -> Result<Event> {
    let line = line.trim();
    let close = line
        .find(']')
        .filter(|_| line.starts_with('['))
        .ok_or_else(|| EngineError::InvalidTimestamp(format!("missing [time] in {:?}", line)))?;

    let timestamp = parse_timestamp(&line[1..close])?;

    let mut fields = line[close + 1..].split_whitespace();
    let (code, id) = match (fields.next(), fields.next()) {
        (Some(code), Some(id)) => (code, id),
        _ => {
            return Err(EngineError::MalformedEvent(format!(
                "expected action and competitor ID in {:?}",
                line
            )))
        }
    };

    let action = code
        .parse::<u32>()
        .ok()
        .and_then(Action::from_code)
        .ok_or_else(|| EngineError::UnknownAction(code.to_string()))?;

    let competitor_id: CompetitorId = id
        .parse()
        .map_err(|_| EngineError::InvalidCompetitorId(id.to_string()))?;

    let extra: Vec<&str> = fields.collect();
    let mut event = Event::new(timestamp, action, competitor_id);
    if !extra.is_empty() {
        event = event.with_extra(extra.join(" "));
    }

    Ok(event)
}

/// Parse a whole event log, skipping blank lines.
///
/// The first invalid line fails the batch; the error carries its 1-based
/// line number.
pub fn parse_event_log<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut events = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event = parse_event_line(&line).map_err(|e| EngineError::AtLine {
            line: index + 1,
            source: Box::new(e),
        })?;
        events.push(event);
    }

    log::debug!("Parsed {} events", events.len());
    Ok(events)
}
