//! Biathlon Results Engine
//!
//! A reusable library that turns a time-ordered batch of race-timing events
//! into an official, ranked results report.
//!
//! # Architecture
//!
//! - Each competitor record is advanced by a small state machine, one event
//!   at a time, computing lap and penalty-loop times and speeds inline
//! - After the feed is exhausted a single pass disqualifies everyone who did
//!   not start inside their start window
//! - The report ranks finishers by total time, then non-finishers, then
//!   non-starters
//!
//! Every applied event produces a narration line that goes to an injected
//! [`NarrationSink`]; the engine itself never prints.
//!
//! The library does NOT:
//! - Read configuration files or parse command-line arguments
//! - Decide where narration or the report end up
//!
//! Those belong to the application layer (biathlon-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use biathlon_engine::{parse_event_log, MemorySink, RaceConfig, RaceEngine};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let config = RaceConfig::new(2, 3651, 50)
//!     .with_start("09:30:00.000")
//!     .with_start_delta("00:00:30");
//! let events = parse_event_log(BufReader::new(File::open("events").unwrap())).unwrap();
//!
//! let mut engine = RaceEngine::new(config, MemorySink::new()).unwrap();
//! for skipped in engine.process_events(&events) {
//!     eprintln!("Skipped: {}", skipped);
//! }
//!
//! print!("{}", engine.generate_report());
//! ```

// Public modules
pub mod competitor;
pub mod config;
pub mod engine;
pub mod feed;
pub mod narration;
pub mod report;
pub mod timing;
pub mod types;

// Re-export main types for convenience
pub use competitor::{Competitor, LapResult, PenaltyResult, Status};
pub use config::RaceConfig;
pub use engine::RaceEngine;
pub use feed::{parse_event_line, parse_event_log};
pub use narration::{Message, MemorySink, Narration, NarrationSink, NullSink, TeeSink, WriterSink};
pub use report::{Report, ReportEntry, ReportRow};
pub use types::{Action, CompetitorId, EngineError, Event, Result, Timestamp};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
