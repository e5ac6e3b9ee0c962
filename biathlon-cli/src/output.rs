//! Narration wiring and report output

use anyhow::{Context, Result};
use biathlon_engine::{NarrationSink, Report, WriterSink};
use clap::ValueEnum;
use std::fs::{self, File};
use std::io::{self, BufWriter, Stdout, Write};
use std::path::Path;

/// Report file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Txt,
    Json,
}

/// Prints each narration line to stdout
#[derive(Debug)]
pub struct ConsoleSink {
    stdout: Stdout,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self { stdout: io::stdout() }
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NarrationSink for ConsoleSink {
    fn append(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.stdout.lock(), "{}", line)
    }
}

/// Open the narration copy file, if one was requested.
///
/// Failing to open it is not fatal: the run continues with console narration only.
pub fn open_log_file(path: Option<&Path>) -> Option<WriterSink<BufWriter<File>>> {
    let path = path?;
    match WriterSink::create(path) {
        Ok(sink) => {
            log::info!("Saving narration to {:?}", path);
            Some(sink)
        }
        Err(e) => {
            log::error!("Error opening log file {:?}: {}", path, e);
            None
        }
    }
}

/// Render the report in the requested format
pub fn render_report(report: &Report, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Txt => Ok(report.to_string()),
        OutputFormat::Json => report.to_json().context("Failed to render JSON report"),
    }
}

/// Write the rendered report to `path`
pub fn save_report(report: &Report, format: OutputFormat, path: &Path) -> Result<()> {
    let content = render_report(report, format)?;
    fs::write(path, content).with_context(|| format!("Failed to write report: {:?}", path))?;
    log::info!("Report ({} rows) saved to {:?}", report.rows().len(), path);
    Ok(())
}
