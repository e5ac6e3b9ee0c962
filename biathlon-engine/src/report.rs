//! Final results report
//!
//! Ranks competitors and renders one line per competitor:
//!
//! ```text
//! [01:05:30.000] 1 [{00:29:03.872, 2.122}, {00:36:26.128, 1.785}] {00:01:52.476, 0.445} 9/10
//! [NotFinished] 2 [{00:29:03.872, 2.093}, {,}] {00:01:44.296, 0.481} 4/5
//! [NotStarted] 3 [{,}, {,}] {,} 0/0
//! ```

use crate::competitor::{Competitor, Status};
use crate::timing::format_duration;
use crate::types::{CompetitorId, Result};
use chrono::TimeDelta;
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Placeholder for a missing lap or penalty entry
const EMPTY_ENTRY: &str = "{,}";

/// Time and speed pair as shown in the report
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReportEntry {
    #[serde(serialize_with = "serialize_duration")]
    pub duration: TimeDelta,
    pub speed: f64,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}, {:.3}}}", format_duration(self.duration), self.speed)
    }
}

/// One ranked competitor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub competitor_id: CompetitorId,
    /// Finished, NotFinished or NotStarted
    pub status: Status,
    #[serde(serialize_with = "serialize_opt_duration")]
    pub total_time: Option<TimeDelta>,
    /// Exactly one slot per configured lap
    pub laps: Vec<Option<ReportEntry>>,
    pub penalty: Option<ReportEntry>,
    pub hits: u32,
    pub shots: u32,
}

impl ReportRow {
    fn from_competitor(comp: &Competitor, laps: u32) -> Self {
        // Anyone still mid-race when the feed ran out did not finish
        let status = match comp.status {
            Status::Finished | Status::NotStarted => comp.status,
            _ => Status::NotFinished,
        };

        let lap_slots = (0..laps as usize)
            .map(|i| {
                comp.lap_results.get(i).map(|lap| ReportEntry {
                    duration: lap.duration,
                    speed: lap.speed,
                })
            })
            .collect();

        let penalty = (comp.hits != comp.shots).then(|| ReportEntry {
            duration: comp.penalty_result.duration,
            speed: comp.penalty_result.speed,
        });

        Self {
            competitor_id: comp.id,
            status,
            total_time: comp.total_time.filter(|_| status == Status::Finished),
            laps: lap_slots,
            penalty,
            hits: comp.hits,
            shots: comp.shots,
        }
    }

    /// 0 = finished, 1 = not finished, 2 = not started
    fn bucket(&self) -> u8 {
        match self.status {
            Status::Finished => 0,
            Status::NotStarted => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.status, self.total_time) {
            (Status::Finished, Some(total)) => write!(f, "[{}]", format_duration(total))?,
            (Status::NotStarted, _) => write!(f, "[NotStarted]")?,
            _ => write!(f, "[NotFinished]")?,
        }
        write!(f, " {} [", self.competitor_id)?;

        for (i, lap) in self.laps.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match lap {
                Some(entry) => write!(f, "{}", entry)?,
                None => write!(f, "{}", EMPTY_ENTRY)?,
            }
        }
        write!(f, "]")?;

        match &self.penalty {
            Some(entry) => write!(f, " {}", entry)?,
            None => write!(f, " {}", EMPTY_ENTRY)?,
        }

        write!(f, " {}/{}", self.hits, self.shots)
    }
}

/// Ranking order: finishers by total time, then non-finishers, then
/// non-starters; ties by competitor ID.
pub fn compare_rows(a: &ReportRow, b: &ReportRow) -> Ordering {
    a.bucket()
        .cmp(&b.bucket())
        .then_with(|| match (a.total_time, b.total_time) {
            (Some(x), Some(y)) if a.bucket() == 0 => x.cmp(&y),
            _ => Ordering::Equal,
        })
        .then_with(|| a.competitor_id.cmp(&b.competitor_id))
}

/// Ranked results of a race
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Rank `competitors` for a race of `laps` laps
    pub fn build(competitors: &[Competitor], laps: u32) -> Self {
        let mut rows: Vec<ReportRow> = competitors
            .iter()
            .map(|comp| ReportRow::from_competitor(comp, laps))
            .collect();
        rows.sort_by(compare_rows);
        Self { rows }
    }

    /// Rows in ranking order
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pretty-printed JSON rendering
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

fn serialize_duration<S: Serializer>(duration: &TimeDelta, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_duration(*duration))
}

fn serialize_opt_duration<S: Serializer>(
    duration: &Option<TimeDelta>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match duration {
        Some(d) => serializer.serialize_some(&format_duration(*d)),
        None => serializer.serialize_none(),
    }
}
