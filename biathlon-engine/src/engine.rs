//! Race engine
//!
//! Owns every competitor record for the duration of a run, applies events
//! strictly in feed order, runs the disqualification pass once and builds the
//! final report.

use crate::competitor::Competitor;
use crate::config::RaceConfig;
use crate::narration::{Message, Narration, NarrationSink};
use crate::report::Report;
use crate::types::{Action, CompetitorId, EngineError, Event, Result};
use crate::timing::race_day;
use chrono::{NaiveTime, TimeDelta};
use std::collections::HashMap;

/// Event-processing engine for a single race
pub struct RaceEngine<S: NarrationSink> {
    config: RaceConfig,
    /// Competitor arena, in order of first appearance
    competitors: Vec<Competitor>,
    /// Competitor ID -> arena index
    index: HashMap<CompetitorId, usize>,
    /// Events that were applied successfully
    history: Vec<Event>,
    sink: S,
    disqualification_done: bool,
}

impl<S: NarrationSink> RaceEngine<S> {
    /// Create an engine for a validated configuration
    pub fn new(config: RaceConfig, sink: S) -> Result<Self> {
        config.validate()?;

        log::debug!(
            "Race engine ready: {} laps of {}m, penalty loop {}m, start {}",
            config.laps,
            config.lap_len,
            config.penalty_len,
            config.start
        );

        Ok(Self {
            config,
            competitors: Vec::new(),
            index: HashMap::new(),
            history: Vec::new(),
            sink,
            disqualification_done: false,
        })
    }

    /// Apply a single event.
    ///
    /// A rejected event leaves every record untouched, is not narrated and
    /// is not added to the history.
    pub fn process_event(&mut self, event: &Event) -> Result<()> {
        log::trace!("Processing {} for competitor({})", event.action, event.competitor_id);

        let slot = self.slot_for(event.competitor_id);
        let message = self.competitors[slot].apply(event, &self.config)?;

        if event.action == Action::EnterFiringRange {
            self.check_firing_line(event.competitor_id, event.extra_str());
        }

        Self::narrate(&mut self.sink, Narration::new(event.timestamp, message));
        self.history.push(event.clone());
        Ok(())
    }

    /// Apply a batch of events in order, skipping (and returning) the ones
    /// that were rejected.
    pub fn process_events<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) -> Vec<EngineError> {
        let mut skipped = Vec::new();
        for event in events {
            if let Err(e) = self.process_event(event) {
                log::warn!("Skipping event: {}", e);
                skipped.push(e);
            }
        }
        log::info!(
            "Processed {} events for {} competitors ({} skipped)",
            self.history.len(),
            self.competitors.len(),
            skipped.len()
        );
        skipped
    }

    /// Mark every competitor who did not start inside their window as not started.
    ///
    /// Runs at most once per engine; later calls return `Ok(0)`. Returns the
    /// number of disqualified competitors. With a malformed start tolerance no
    /// one is disqualified and the error is returned.
    pub fn check_disqualifications(&mut self) -> Result<usize> {
        if self.disqualification_done {
            return Ok(0);
        }
        self.disqualification_done = true;

        let tolerance = match self.config.start_tolerance() {
            Ok(tolerance) => tolerance,
            Err(e) => {
                log::error!("Skipping disqualification check: {}", e);
                return Err(e);
            }
        };

        // Records without a drawn start time get a window opening at midnight
        let midnight = race_day().and_time(NaiveTime::MIN);

        let mut disqualified = 0;
        for comp in self.competitors.iter_mut() {
            if comp.started_within(tolerance) {
                continue;
            }
            let window_end = comp.planned_start.unwrap_or(midnight) + tolerance;

            comp.disqualify();
            disqualified += 1;
            log::debug!("competitor({}) disqualified: {:?}", comp.id, comp.comment);

            let at = window_end + TimeDelta::milliseconds(1);
            Self::narrate(
                &mut self.sink,
                Narration::new(at, Message::Disqualified { competitor: comp.id }),
            );
        }

        Ok(disqualified)
    }

    /// Run the disqualification pass (if not done yet) and rank everyone
    pub fn generate_report(&mut self) -> Report {
        // The error is already logged; ranking proceeds without disqualifications
        let _ = self.check_disqualifications();
        Report::build(&self.competitors, self.config.laps)
    }

    /// Look up a competitor by ID
    pub fn competitor(&self, id: CompetitorId) -> Option<&Competitor> {
        self.index.get(&id).map(|&slot| &self.competitors[slot])
    }

    /// All competitors in order of first appearance
    pub fn competitors(&self) -> &[Competitor] {
        &self.competitors
    }

    /// Successfully applied events, in order
    pub fn history(&self) -> &[Event] {
        &self.history
    }

    pub fn config(&self) -> &RaceConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the engine and hand back the narration sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Arena slot for `id`, creating a Registered record on first sight
    fn slot_for(&mut self, id: CompetitorId) -> usize {
        if let Some(&slot) = self.index.get(&id) {
            return slot;
        }
        let slot = self.competitors.len();
        let mut comp = Competitor::new(id);
        comp.lap_results.reserve(self.config.laps as usize);
        self.competitors.push(comp);
        self.index.insert(id, slot);
        slot
    }

    fn check_firing_line(&self, competitor: CompetitorId, range: &str) {
        match range.trim().parse::<u32>() {
            Ok(line) if line >= 1 && line <= self.config.firing_lines => {}
            _ => log::warn!(
                "competitor({}) reported firing range {:?}, configured lines: 1..={}",
                competitor,
                range,
                self.config.firing_lines
            ),
        }
    }

    fn narrate(sink: &mut S, narration: Narration) {
        if let Err(e) = sink.append(&narration.to_string()) {
            log::warn!("Failed to write narration: {}", e);
        }
    }
}

impl<S: NarrationSink> std::fmt::Debug for RaceEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceEngine")
            .field("config", &self.config)
            .field("competitors", &self.competitors.len())
            .field("events", &self.history.len())
            .field("disqualification_done", &self.disqualification_done)
            .finish()
    }
}
