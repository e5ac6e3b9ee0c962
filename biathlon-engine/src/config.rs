//! Race configuration
//!
//! Mirrors the upstream JSON configuration file. Loading the file from disk is
//! the application's job; this module only defines the shape and its checks.

use crate::timing::{parse_timestamp, parse_tolerance};
use crate::types::{EngineError, Result, Timestamp};
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

/// Parameters of a single race
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceConfig {
    /// Number of main laps
    pub laps: u32,

    /// Length of one main lap in meters
    pub lap_len: u32,

    /// Length of one penalty loop in meters
    pub penalty_len: u32,

    /// Number of firing lines on the range
    #[serde(default = "default_firing_lines")]
    pub firing_lines: u32,

    /// Nominal start time, `HH:MM:SS.mmm`
    #[serde(default = "default_start")]
    pub start: String,

    /// Start window tolerance, `HH:MM:SS`
    #[serde(default = "default_start_delta")]
    pub start_delta: String,
}

fn default_firing_lines() -> u32 {
    1
}

fn default_start() -> String {
    "00:00:00.000".to_string()
}

fn default_start_delta() -> String {
    "00:00:00".to_string()
}

impl RaceConfig {
    /// Create a configuration with the given course layout and default timing
    pub fn new(laps: u32, lap_len: u32, penalty_len: u32) -> Self {
        Self {
            laps,
            lap_len,
            penalty_len,
            firing_lines: default_firing_lines(),
            start: default_start(),
            start_delta: default_start_delta(),
        }
    }

    /// Parse a configuration from its JSON representation
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder method: set the number of firing lines
    pub fn with_firing_lines(mut self, firing_lines: u32) -> Self {
        self.firing_lines = firing_lines;
        self
    }

    /// Builder method: set the nominal start time
    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start = start.into();
        self
    }

    /// Builder method: set the start window tolerance
    pub fn with_start_delta(mut self, start_delta: impl Into<String>) -> Self {
        self.start_delta = start_delta.into();
        self
    }

    /// Check the values the engine cannot run without.
    ///
    /// The start tolerance is not checked here: a malformed tolerance only
    /// disables the disqualification pass.
    pub fn validate(&self) -> Result<()> {
        if self.laps == 0 {
            return Err(EngineError::InvalidConfig("laps must be at least 1".to_string()));
        }
        if self.lap_len == 0 {
            return Err(EngineError::InvalidConfig("lapLen must be positive".to_string()));
        }
        if self.penalty_len == 0 {
            return Err(EngineError::InvalidConfig("penaltyLen must be positive".to_string()));
        }
        self.nominal_start()
            .map_err(|e| EngineError::InvalidConfig(format!("start: {}", e)))?;
        Ok(())
    }

    /// Nominal start time as a timestamp
    pub fn nominal_start(&self) -> Result<Timestamp> {
        parse_timestamp(&self.start)
    }

    /// Start window tolerance as a duration
    pub fn start_tolerance(&self) -> Result<TimeDelta> {
        parse_tolerance(&self.start_delta)
    }
}
