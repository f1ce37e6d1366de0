//! CAN Trace Decoder CLI Application
//!
//! This is the command-line interface for the CAN trace decoder.
//! It uses the can-trace-decoder library and adds:
//! - Log acquisition from a file or stdin
//! - Signal dictionary loading from a TOML config
//! - Table / CSV / JSON output
//! - Latest-sample and drop summaries

use anyhow::{Context, Result};
use can_trace_decoder::{Decoder, DecoderConfig, SignalDictionary};
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

mod config;
mod report;

use report::OutputFormat;

/// Rows shown by the table format when --tail is not given
const DEFAULT_TABLE_ROWS: usize = 20;

/// CAN Trace Decoder - Decode textual CAN logs into physical signal values
#[derive(Parser, Debug)]
#[command(name = "can-trace-cli")]
#[command(about = "Decode textual CAN logs (candump / CSV) into signal values", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the log file to decode (default: stdin)
    #[arg(short, long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Path to configuration file with the signal dictionary (default: built-in demo dictionary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output file for decoded samples (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Only output the last N samples (0 = all; table default: 20)
    #[arg(long, value_name = "COUNT")]
    tail: Option<usize>,

    /// Only decode these message IDs (hex with 0x prefix or decimal, can be repeated)
    #[arg(long = "id", value_name = "ID", value_parser = parse_can_id)]
    ids: Vec<u32>,

    /// Drop frames with fewer payload bytes than this
    #[arg(long, value_name = "BYTES")]
    min_payload: Option<usize>,

    /// Decode frames in parallel
    #[arg(long)]
    parallel: bool,

    /// Print the fields of the latest decoded sample instead of all samples
    #[arg(long)]
    latest: bool,

    /// Print parse/decode statistics to stderr
    #[arg(long)]
    report: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("CAN Trace Decoder CLI v{}", env!("CARGO_PKG_VERSION"));
    log::debug!("Using decoder library v{}", can_trace_decoder::VERSION);

    run(&args)
}

/// Load the dictionary, decode the log, write the results
fn run(args: &Args) -> Result<()> {
    let (dictionary, mut decoder_config) = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            let app_config = config::load_config(path)?;
            let dictionary = app_config
                .dictionary()
                .with_context(|| format!("Invalid signal dictionary in {:?}", path))?;
            (dictionary, app_config.decoder)
        }
        None => {
            log::info!("No configuration given, using the demo dictionary");
            (SignalDictionary::demo(), DecoderConfig::default())
        }
    };
    apply_overrides(&mut decoder_config, args);
    decoder_config
        .validate()
        .context("Invalid decoder configuration")?;

    let decoder = Decoder::new(dictionary).with_config(decoder_config);
    let stats = decoder.dictionary_stats();
    log::info!(
        "Signal dictionary: {} frames, {} signals",
        stats.num_frames,
        stats.num_signals
    );

    let text = read_log(args)?;
    let run = decoder.decode_text_with_report(&text);

    if args.report {
        report::render_summary(&mut io::stderr().lock(), &run)?;
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create output file: {:?}", path))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if args.latest {
        report::render_latest(&mut out, run.latest(), decoder.dictionary())?;
    } else {
        let samples = tail(&run.samples, effective_tail(args));
        report::render(&mut out, args.format, samples, decoder.dictionary())?;
    }
    out.flush()?;

    if run.samples.is_empty() {
        log::warn!("No frames decoded");
    }
    Ok(())
}

/// Command-line flags win over the config file
fn apply_overrides(config: &mut DecoderConfig, args: &Args) {
    if !args.ids.is_empty() {
        config.message_filter = Some(args.ids.clone());
    }
    if let Some(min) = args.min_payload {
        config.min_payload_len = Some(min);
    }
    if args.parallel {
        config.parallel = true;
    }
}

fn read_log(args: &Args) -> Result<String> {
    match &args.log {
        Some(path) => {
            log::info!("Decoding log file: {:?}", path);
            fs::read_to_string(path).with_context(|| format!("Failed to read log file: {:?}", path))
        }
        None => {
            log::info!("Reading log from stdin");
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read log from stdin")?;
            Ok(text)
        }
    }
}

fn effective_tail(args: &Args) -> Option<usize> {
    match (args.tail, args.format) {
        (Some(0), _) => None,
        (Some(count), _) => Some(count),
        (None, OutputFormat::Table) => Some(DEFAULT_TABLE_ROWS),
        (None, _) => None,
    }
}

fn tail<T>(items: &[T], count: Option<usize>) -> &[T] {
    match count {
        Some(count) => &items[items.len().saturating_sub(count)..],
        None => items,
    }
}

/// Parse a CAN ID given as `0x`-prefixed hex or decimal
fn parse_can_id(text: &str) -> std::result::Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid CAN ID '{}': {}", text, e))
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

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
