//! Core types for the biathlon results engine
//!
//! This module defines the fundamental types the engine consumes: timing events,
//! the closed set of action kinds, and the error type shared by the whole crate.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the engine.
///
/// Event logs only carry a time of day; every timestamp is anchored on
/// [`crate::timing::race_day`] so arithmetic never wraps at midnight.
pub type Timestamp = NaiveDateTime;

/// Competitor identifier as it appears in the event log
pub type CompetitorId = u32;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while loading or processing a race
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid competitor ID: {0}")]
    InvalidCompetitorId(String),

    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    #[error("Line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<EngineError>,
    },

    #[error("Invalid start time for competitor({competitor}): {value:?}")]
    InvalidStartTime {
        competitor: CompetitorId,
        value: String,
    },

    #[error("Invalid start tolerance: {0:?}")]
    InvalidTolerance(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Rejected {action} for competitor({competitor}): {reason}")]
    RejectedTransition {
        competitor: CompetitorId,
        action: Action,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// The eleven kinds of timing events, keyed by their upstream numeric code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Competitor registered for the race
    Register,
    /// Start time drawn; extra text holds the planned start
    SetStartTime,
    /// Competitor arrived at the start line
    ArriveStartLine,
    /// Competitor crossed the start
    Start,
    /// Competitor entered a firing range; extra text holds the range id
    EnterFiringRange,
    /// A target was hit; extra text holds the target id
    RegisterHit,
    /// Competitor left the firing range (5 shots fired)
    LeaveFiringRange,
    /// Competitor entered the penalty loop
    EnterPenaltyLoop,
    /// Competitor left the penalty loop
    LeavePenaltyLoop,
    /// Competitor completed a main lap
    FinishLap,
    /// Competitor cannot continue; extra text holds the reason
    Withdraw,
}

impl Action {
    /// All action kinds in code order
    pub const ALL: [Action; 11] = [
        Action::Register,
        Action::SetStartTime,
        Action::ArriveStartLine,
        Action::Start,
        Action::EnterFiringRange,
        Action::RegisterHit,
        Action::LeaveFiringRange,
        Action::EnterPenaltyLoop,
        Action::LeavePenaltyLoop,
        Action::FinishLap,
        Action::Withdraw,
    ];

    /// Upstream numeric code (1-based)
    pub fn code(self) -> u32 {
        match self {
            Action::Register => 1,
            Action::SetStartTime => 2,
            Action::ArriveStartLine => 3,
            Action::Start => 4,
            Action::EnterFiringRange => 5,
            Action::RegisterHit => 6,
            Action::LeaveFiringRange => 7,
            Action::EnterPenaltyLoop => 8,
            Action::LeavePenaltyLoop => 9,
            Action::FinishLap => 10,
            Action::Withdraw => 11,
        }
    }

    /// Look up an action by its upstream numeric code
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|action| action.code() == code)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Register => "Register",
            Action::SetStartTime => "SetStartTime",
            Action::ArriveStartLine => "ArriveStartLine",
            Action::Start => "Start",
            Action::EnterFiringRange => "EnterFiringRange",
            Action::RegisterHit => "RegisterHit",
            Action::LeaveFiringRange => "LeaveFiringRange",
            Action::EnterPenaltyLoop => "EnterPenaltyLoop",
            Action::LeavePenaltyLoop => "LeavePenaltyLoop",
            Action::FinishLap => "FinishLap",
            Action::Withdraw => "Withdraw",
        };
        f.write_str(name)
    }
}

/// A single timing event from the event feed
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// When the event happened
    pub timestamp: Timestamp,
    /// What happened
    pub action: Action,
    /// Who it happened to
    pub competitor_id: CompetitorId,
    /// Free-form parameter; meaning depends on the action kind
    pub extra: Option<String>,
}

impl Event {
    /// Create an event without extra text
    pub fn new(timestamp: Timestamp, action: Action, competitor_id: CompetitorId) -> Self {
        Self {
            timestamp,
            action,
            competitor_id,
            extra: None,
        }
    }

    /// Builder method: attach extra text
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Extra text, or an empty string when absent
    pub fn extra_str(&self) -> &str {
        self.extra.as_deref().unwrap_or("")
    }
}
