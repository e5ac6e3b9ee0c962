//! Timestamp and duration helpers
//!
//! Event logs and reports use two textual forms: `HH:MM:SS.mmm` for both
//! times of day and durations, and `HH:MM:SS` for the start tolerance.

use crate::types::{EngineError, Result, Timestamp};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

/// Time-of-day layout used by event logs and the configuration
pub const TIME_FORMAT: &str = "%H:%M:%S%.3f";

/// Date every parsed time of day is anchored on
pub fn race_day() -> NaiveDate {
    NaiveDate::default()
}

/// Parse `HH:MM:SS.mmm` into a [`Timestamp`]
pub fn parse_timestamp(text: &str) -> Result<Timestamp> {
    let time = NaiveTime::parse_from_str(text, TIME_FORMAT)
        .map_err(|e| EngineError::InvalidTimestamp(format!("{:?}: {}", text, e)))?;
    Ok(NaiveDateTime::new(race_day(), time))
}

/// Format a timestamp for narration: `[HH:MM:SS.mmm]`
pub fn format_timestamp(timestamp: Timestamp) -> String {
    format!("[{}]", timestamp.format(TIME_FORMAT))
}

/// Format a duration as zero-padded `HH:MM:SS.mmm`
///
/// Hours are not wrapped at 24. Negative durations get a leading `-`.
pub fn format_duration(duration: TimeDelta) -> String {
    let total_ms = duration.num_milliseconds();
    let sign = if total_ms < 0 { "-" } else { "" };
    let ms = total_ms.unsigned_abs();

    let hours = ms / 3_600_000;
    let minutes = (ms / 60_000) % 60;
    let seconds = (ms / 1_000) % 60;
    let millis = ms % 1_000;

    format!("{}{:02}:{:02}:{:02}.{:03}", sign, hours, minutes, seconds, millis)
}

/// Parse a start tolerance in `HH:MM:SS` form
///
/// Exactly three `:`-separated segments are required. A segment that is not
/// a number counts as zero.
pub fn parse_tolerance(text: &str) -> Result<TimeDelta> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        return Err(EngineError::InvalidTolerance(text.to_string()));
    }

    let mut total_seconds: i64 = 0;
    for (part, scale) in parts.iter().zip([3600, 60, 1]) {
        let value: u32 = part.trim().parse().unwrap_or_else(|_| {
            log::warn!("Start tolerance {:?}: segment {:?} read as 0", text, part);
            0
        });
        total_seconds += i64::from(value) * scale;
    }

    Ok(TimeDelta::seconds(total_seconds))
}

/// Duration in fractional seconds (millisecond resolution)
pub fn as_seconds(duration: TimeDelta) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}

/// Average speed in meters per second; zero for non-positive durations
pub fn speed(distance_m: u64, duration: TimeDelta) -> f64 {
    let seconds = as_seconds(duration);
    if seconds > 0.0 {
        distance_m as f64 / seconds
    } else {
        0.0
    }
}
