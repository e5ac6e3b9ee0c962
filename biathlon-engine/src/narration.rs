//! Narration: the human-readable line emitted for every applied event
//!
//! The engine never prints anything itself. It renders a [`Narration`] and
//! hands the line to a [`NarrationSink`] injected by the caller.

use crate::timing::format_timestamp;
use crate::types::{CompetitorId, Timestamp};
use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Message catalog
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Registered { competitor: CompetitorId },
    StartTimeSet { competitor: CompetitorId, start: String },
    OnStartLine { competitor: CompetitorId },
    Started { competitor: CompetitorId },
    OnFiringRange { competitor: CompetitorId, range: String },
    TargetHit { competitor: CompetitorId, target: String },
    LeftFiringRange { competitor: CompetitorId },
    EnteredPenaltyLaps { competitor: CompetitorId },
    LeftPenaltyLaps { competitor: CompetitorId },
    LapEnded { competitor: CompetitorId },
    Finished { competitor: CompetitorId },
    CannotContinue { competitor: CompetitorId, reason: String },
    Disqualified { competitor: CompetitorId },
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Registered { competitor } => {
                write!(f, "The competitor({}) registered", competitor)
            }
            Message::StartTimeSet { competitor, start } => write!(
                f,
                "The start time for the competitor({}) was set by a draw to {}",
                competitor, start
            ),
            Message::OnStartLine { competitor } => {
                write!(f, "The competitor({}) is on the start line", competitor)
            }
            Message::Started { competitor } => {
                write!(f, "The competitor({}) has started", competitor)
            }
            Message::OnFiringRange { competitor, range } => {
                write!(f, "The competitor({}) is on the firing range({})", competitor, range)
            }
            Message::TargetHit { competitor, target } => {
                write!(f, "The target({}) has been hit by competitor({})", target, competitor)
            }
            Message::LeftFiringRange { competitor } => {
                write!(f, "The competitor({}) left the firing range", competitor)
            }
            Message::EnteredPenaltyLaps { competitor } => {
                write!(f, "The competitor({}) entered the penalty laps", competitor)
            }
            Message::LeftPenaltyLaps { competitor } => {
                write!(f, "The competitor({}) left the penalty laps", competitor)
            }
            Message::LapEnded { competitor } => {
                write!(f, "The competitor({}) ended the main lap", competitor)
            }
            Message::Finished { competitor } => {
                write!(f, "The competitor({}) has finished", competitor)
            }
            Message::CannotContinue { competitor, reason } => {
                write!(f, "The competitor({}) can`t continue: {}", competitor, reason)
            }
            Message::Disqualified { competitor } => {
                write!(f, "The competitor({}) is disqualified", competitor)
            }
        }
    }
}

/// A timestamped narration line
#[derive(Debug, Clone, PartialEq)]
pub struct Narration {
    pub timestamp: Timestamp,
    pub message: Message,
}

impl Narration {
    pub fn new(timestamp: Timestamp, message: Message) -> Self {
        Self { timestamp, message }
    }
}

impl fmt::Display for Narration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format_timestamp(self.timestamp), self.message)
    }
}

/// Write-only destination for narration lines
pub trait NarrationSink {
    /// Append one line (without trailing newline)
    fn append(&mut self, line: &str) -> io::Result<()>;
}

impl<S: NarrationSink + ?Sized> NarrationSink for &mut S {
    fn append(&mut self, line: &str) -> io::Result<()> {
        (**self).append(line)
    }
}

impl<S: NarrationSink + ?Sized> NarrationSink for Box<S> {
    fn append(&mut self, line: &str) -> io::Result<()> {
        (**self).append(line)
    }
}

/// Discards every line
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NarrationSink for NullSink {
    fn append(&mut self, _line: &str) -> io::Result<()> {
        Ok(())
    }
}

/// Keeps every line in memory
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines appended so far, in order
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl NarrationSink for MemorySink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Persists lines to any writer, one per line, flushed after each append
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl WriterSink<BufWriter<File>> {
    /// Create (or truncate) a narration file
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> NarrationSink for WriterSink<W> {
    fn append(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.writer, "{}", line)?;
        self.writer.flush()
    }
}

/// Sends every line to two sinks
///
/// Both sinks always receive the line; the first error is reported.
#[derive(Debug, Default)]
pub struct TeeSink<A, B> {
    first: A,
    second: B,
}

impl<A: NarrationSink, B: NarrationSink> TeeSink<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn into_parts(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: NarrationSink, B: NarrationSink> NarrationSink for TeeSink<A, B> {
    fn append(&mut self, line: &str) -> io::Result<()> {
        let first = self.first.append(line);
        let second = self.second.append(line);
        first.and(second)
    }
}

impl<S: NarrationSink> NarrationSink for Option<S> {
    fn append(&mut self, line: &str) -> io::Result<()> {
        match self {
            Some(sink) => sink.append(line),
            None => Ok(()),
        }
    }
}
