//! Biathlon Results CLI
//!
//! Command-line front end for the biathlon-engine library. It adds:
//! - Race configuration loading (JSON)
//! - Event log loading
//! - Narration to the console and optionally to a file
//! - Report persistence (TXT/JSON)

use anyhow::{Context, Result};
use biathlon_engine::{parse_event_log, RaceEngine, TeeSink};
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

mod config;
mod output;

use output::{ConsoleSink, OutputFormat};

/// Biathlon Results - Turn a race event log into a ranked results table
#[derive(Parser, Debug)]
#[command(name = "biathlon")]
#[command(about = "Process biathlon race events into a results report", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the event log
    #[arg(long, value_name = "FILE")]
    events_file: PathBuf,

    /// Path to the race configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config_file: PathBuf,

    /// Where to write the results report
    #[arg(long, value_name = "FILE", default_value = "resultingTable")]
    result_file: PathBuf,

    /// Also save the narration to this file
    #[arg(long, value_name = "FILE")]
    save_logs: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Txt)]
    format: OutputFormat,

    /// Do not print narration to the console
    #[arg(long)]
    no_narration: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all diagnostics except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("Biathlon Results CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using engine library v{}", biathlon_engine::VERSION);

    let config = config::load_config(&args.config_file)?;
    log::debug!("Configuration loaded: {:?}", config);

    // Structural errors in the log abort the run before any event is applied
    let file = File::open(&args.events_file)
        .with_context(|| format!("Failed to open events file: {:?}", args.events_file))?;
    let events = parse_event_log(BufReader::new(file))
        .with_context(|| format!("Failed to load events from {:?}", args.events_file))?;

    let console = (!args.no_narration).then(ConsoleSink::new);
    let log_file = output::open_log_file(args.save_logs.as_deref());
    let sink = TeeSink::new(console, log_file);

    let mut engine = RaceEngine::new(config, sink)?;
    let skipped = engine.process_events(&events);
    for error in &skipped {
        eprintln!("Error: {}", error);
    }

    let report = engine.generate_report();
    output::save_report(&report, args.format, &args.result_file)?;

    println!("\nProcessing completed: {} events, {} skipped", events.len(), skipped.len());
    if let Some(path) = &args.save_logs {
        println!("Logs saved to: {}", path.display());
    }
    println!("Report saved to: {}", args.result_file.display());

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
