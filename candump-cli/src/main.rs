//! candump decoder CLI
//!
//! Decodes a candump text log against DBC signal layouts and produces:
//! - a wide CSV (one column per signal, rows sorted by timestamp)
//! - an optional JSON snapshot of the run statistics
//! - a summary report on stdout (totals, per-ID table, DLC adjustments,
//!   decode errors)

use anyhow::{Context, Result};
use candump_decoder::{AggregateStats, CanFrame, CandumpParser, DecodeResult, Decoder};
use clap::Parser;
use rayon::prelude::*;
use std::path::PathBuf;

mod config;
mod export;
mod report;

use export::DecodedRow;

/// Frames per rayon work unit; partial stats are merged in chunk order
const DECODE_CHUNK: usize = 4096;

/// Candump Decoder - decode candump logs into wide CSV with statistics
#[derive(Parser, Debug)]
#[command(name = "candump-cli")]
#[command(about = "Decode candump text logs using DBC signal layouts", long_about = None)]
#[command(version)]
struct Args {
    /// Path to candump log file to decode
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Path to DBC file(s) (can be repeated)
    #[arg(long, value_name = "FILE")]
    dbc: Vec<PathBuf>,

    /// Output CSV file for decoded signals
    #[arg(short, long, value_name = "FILE", default_value = "decoded.csv")]
    out: PathBuf,

    /// Optional JSON file for the final statistics snapshot
    #[arg(long, value_name = "FILE")]
    stats_json: Option<PathBuf>,

    /// Path to a TOML configuration file instead of flags
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// Resolved run parameters, from flags or a config file
struct Run {
    log: PathBuf,
    dbc_files: Vec<PathBuf>,
    csv: PathBuf,
    stats_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    log::info!("Candump Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", candump_decoder::VERSION);

    let run = resolve_run(&args)?;

    // Load signal layouts
    let mut decoder = Decoder::new();
    for dbc_path in &run.dbc_files {
        decoder
            .add_dbc(dbc_path)
            .with_context(|| format!("loading DBC file {:?}", dbc_path))?;
    }
    let layout_stats = decoder.layout_stats();
    log::info!(
        "Signal database ready: {} messages, {} signals",
        layout_stats.num_messages,
        layout_stats.num_signals
    );

    // Read the log up front; frames decode independently afterwards
    log::info!("Reading CAN log file: {:?}", run.log);
    let frames: Vec<CanFrame> = CandumpParser::parse(&run.log)?
        .collect::<candump_decoder::Result<_>>()
        .with_context(|| format!("reading log file {:?}", run.log))?;
    log::info!("Read {} frames", frames.len());

    let (rows, stats) = decode_frames(&decoder, &frames);

    export::write_wide_csv(&run.csv, &rows)?;
    log::info!("CSV exported to: {:?}", run.csv);

    if let Some(stats_path) = &run.stats_json {
        export::write_stats_json(stats_path, &stats)?;
        log::info!("Statistics exported to: {:?}", stats_path);
    }

    report::print_summary(&stats);

    Ok(())
}

/// Merge command line and config file into the run parameters
fn resolve_run(args: &Args) -> Result<Run> {
    if let Some(config_path) = &args.config {
        let config = config::load_config(config_path)?;
        Ok(Run {
            log: config.input.log,
            dbc_files: config.input.dbc_files,
            csv: config.output.csv,
            stats_json: config.output.stats_json,
        })
    } else {
        let log = args
            .log
            .clone()
            .context("--log is required (or use --config)")?;
        if args.dbc.is_empty() {
            anyhow::bail!("at least one --dbc file is required (or use --config)");
        }
        Ok(Run {
            log,
            dbc_files: args.dbc.clone(),
            csv: args.out.clone(),
            stats_json: args.stats_json.clone(),
        })
    }
}

/// Decode all frames and fold the outcomes into one statistics value.
///
/// Contiguous chunks decode in parallel; the layout table is read-only and
/// each frame decodes independently. Merging partial stats in chunk order
/// keeps every diagnostic list in original frame order, so the result is
/// identical to a sequential fold.
fn decode_frames(decoder: &Decoder, frames: &[CanFrame]) -> (Vec<DecodedRow>, AggregateStats) {
    let partials: Vec<(Vec<DecodedRow>, AggregateStats)> = frames
        .par_chunks(DECODE_CHUNK)
        .map(|chunk| {
            let mut rows = Vec::new();
            let mut stats = AggregateStats::new();
            for frame in chunk {
                let result = decoder.decode_frame(frame);
                stats.record(frame, &result);
                if let DecodeResult::Decoded { signals, .. } = result {
                    rows.push(DecodedRow {
                        timestamp: frame.timestamp,
                        signals,
                    });
                }
            }
            (rows, stats)
        })
        .collect();

    let mut rows = Vec::new();
    let mut stats = AggregateStats::new();
    for (chunk_rows, chunk_stats) in partials {
        rows.extend(chunk_rows);
        stats.merge(chunk_stats);
    }
    (rows, stats)
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
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
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
