//! Competitor record and its per-event state machine
//!
//! Each event for a competitor is applied in full or not at all: a rejected
//! transition leaves the record untouched and produces no narration.

use crate::config::RaceConfig;
use crate::narration::Message;
use crate::timing::{parse_timestamp, speed};
use crate::types::{Action, CompetitorId, EngineError, Event, Result, Timestamp};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shots fired per firing-range visit
pub const SHOTS_PER_STAGE: u32 = 5;

/// Where a competitor is in the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Registered,
    OnStartLine,
    Started,
    OnFiringRange,
    LeftFiringRange,
    OnPenaltyLaps,
    LeftPenaltyLaps,
    FinishedLap,
    Finished,
    NotFinished,
    NotStarted,
}

impl Status {
    /// True for statuses no further event is expected to change
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Finished | Status::NotFinished | Status::NotStarted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Time and average speed of one completed main lap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LapResult {
    pub duration: TimeDelta,
    /// Meters per second
    pub speed: f64,
}

/// Accumulated time and average speed over all penalty loops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PenaltyResult {
    pub duration: TimeDelta,
    /// Meters per second
    pub speed: f64,
}

impl Default for PenaltyResult {
    fn default() -> Self {
        Self {
            duration: TimeDelta::zero(),
            speed: 0.0,
        }
    }
}

/// Everything the engine knows about one competitor
#[derive(Debug, Clone, PartialEq)]
pub struct Competitor {
    pub id: CompetitorId,
    pub status: Status,
    /// Start time drawn for this competitor
    pub planned_start: Option<Timestamp>,
    /// When the competitor actually crossed the start
    pub actual_start: Option<Timestamp>,
    /// 1-based index of the lap in progress (0 before the start)
    pub current_lap: u32,
    pub lap_results: Vec<LapResult>,
    pub penalty_result: PenaltyResult,
    /// Reference point for the lap in progress
    pub lap_start: Option<Timestamp>,
    /// Entry time of the penalty loop in progress
    pub penalty_start: Option<Timestamp>,
    pub penalty_time: TimeDelta,
    pub hits: u32,
    pub shots: u32,
    /// Hits in the current firing stage; reset every lap
    pub last_stage_hits: u32,
    /// Hits during the current firing-range visit; reset on entry
    pub visit_hits: u32,
    pub total_time: Option<TimeDelta>,
    /// Withdrawal reason or disqualification note
    pub comment: Option<String>,
}

impl Competitor {
    /// Fresh record in the Registered state
    pub fn new(id: CompetitorId) -> Self {
        Self {
            id,
            status: Status::Registered,
            planned_start: None,
            actual_start: None,
            current_lap: 0,
            lap_results: Vec::new(),
            penalty_result: PenaltyResult::default(),
            lap_start: None,
            penalty_start: None,
            penalty_time: TimeDelta::zero(),
            hits: 0,
            shots: 0,
            last_stage_hits: 0,
            visit_hits: 0,
            total_time: None,
            comment: None,
        }
    }

    /// Number of missed shots so far
    pub fn misses(&self) -> u32 {
        self.shots.saturating_sub(self.hits)
    }

    /// Apply one event and return the narration it produces
    pub fn apply(&mut self, event: &Event, config: &RaceConfig) -> Result<Message> {
        let competitor = self.id;
        let message = match event.action {
            Action::Register => {
                self.status = Status::Registered;
                Message::Registered { competitor }
            }
            Action::SetStartTime => {
                let start = parse_timestamp(event.extra_str()).map_err(|_| {
                    EngineError::InvalidStartTime {
                        competitor,
                        value: event.extra_str().to_string(),
                    }
                })?;
                self.planned_start = Some(start);
                self.lap_start = Some(start);
                self.status = Status::Registered;
                Message::StartTimeSet {
                    competitor,
                    start: event.extra_str().to_string(),
                }
            }
            Action::ArriveStartLine => {
                self.status = Status::OnStartLine;
                Message::OnStartLine { competitor }
            }
            Action::Start => {
                self.actual_start = Some(event.timestamp);
                self.current_lap = 1;
                self.status = Status::Started;
                Message::Started { competitor }
            }
            Action::EnterFiringRange => {
                self.visit_hits = 0;
                self.status = Status::OnFiringRange;
                Message::OnFiringRange {
                    competitor,
                    range: event.extra_str().to_string(),
                }
            }
            Action::RegisterHit => {
                if self.visit_hits >= SHOTS_PER_STAGE {
                    return Err(self.reject(event, "more than five hits in one firing-range visit"));
                }
                self.hits += 1;
                self.visit_hits += 1;
                self.last_stage_hits += 1;
                Message::TargetHit {
                    competitor,
                    target: event.extra_str().to_string(),
                }
            }
            Action::LeaveFiringRange => {
                self.shots += SHOTS_PER_STAGE;
                self.status = Status::LeftFiringRange;
                Message::LeftFiringRange { competitor }
            }
            Action::EnterPenaltyLoop => {
                self.penalty_start = Some(event.timestamp);
                self.status = Status::OnPenaltyLaps;
                Message::EnteredPenaltyLaps { competitor }
            }
            Action::LeavePenaltyLoop => {
                let entered = self
                    .penalty_start
                    .ok_or_else(|| self.reject(event, "left the penalty loop without entering it"))?;
                self.leave_penalty_loop(event.timestamp - entered, config);
                Message::LeftPenaltyLaps { competitor }
            }
            Action::FinishLap => {
                if self.lap_results.len() >= config.laps as usize {
                    return Err(self.reject(event, "all laps already completed"));
                }
                self.finish_lap(event.timestamp, config)
            }
            Action::Withdraw => {
                self.status = Status::NotFinished;
                self.comment = event.extra.clone();
                Message::CannotContinue {
                    competitor,
                    reason: event.extra_str().to_string(),
                }
            }
        };

        Ok(message)
    }

    /// Close the current penalty segment and refresh the cumulative result
    fn leave_penalty_loop(&mut self, segment: TimeDelta, config: &RaceConfig) {
        self.penalty_time += segment;
        self.penalty_start = None;

        let distance = u64::from(self.misses()) * u64::from(config.penalty_len);
        self.penalty_result = PenaltyResult {
            duration: self.penalty_time,
            speed: speed(distance, self.penalty_time),
        };
        self.status = Status::LeftPenaltyLaps;
    }

    fn finish_lap(&mut self, at: Timestamp, config: &RaceConfig) -> Message {
        // Without a drawn start time the record is disqualified later; the
        // actual start only keeps the figures finite until then
        let planned = self.planned_start.or(self.actual_start).unwrap_or(at);
        let duration = at - self.lap_start.unwrap_or(planned);

        let stage_misses = SHOTS_PER_STAGE.saturating_sub(self.last_stage_hits);
        let distance = u64::from(config.lap_len) + u64::from(stage_misses) * u64::from(config.penalty_len);
        self.last_stage_hits = 0;

        self.lap_results.push(LapResult {
            duration,
            speed: speed(distance, duration),
        });
        self.status = Status::FinishedLap;

        if self.current_lap >= config.laps {
            self.status = Status::Finished;
            self.total_time = Some(at - planned);
            Message::Finished { competitor: self.id }
        } else {
            self.current_lap += 1;
            self.lap_start = Some(at);
            Message::LapEnded { competitor: self.id }
        }
    }

    /// Whether the actual start falls inside `[planned, planned + tolerance]`.
    ///
    /// A competitor without a drawn start time never started validly.
    pub fn started_within(&self, tolerance: TimeDelta) -> bool {
        match (self.planned_start, self.actual_start) {
            (Some(planned), Some(actual)) => actual >= planned && actual <= planned + tolerance,
            _ => false,
        }
    }

    /// Mark the competitor as not started
    pub fn disqualify(&mut self) {
        self.status = Status::NotStarted;
        self.comment = Some(match (self.planned_start, self.actual_start) {
            (None, _) => "no start time drawn".to_string(),
            (Some(_), Some(_)) => "started outside the start window".to_string(),
            (Some(_), None) => "did not start".to_string(),
        });
    }

    fn reject(&self, event: &Event, reason: &str) -> EngineError {
        EngineError::RejectedTransition {
            competitor: self.id,
            action: event.action,
            reason: reason.to_string(),
        }
    }
}
