//! Standalone text log decoder tool
//!
//! Decodes a candump / CSV text log with the demo dictionary and prints every
//! decoded sample followed by a summary of what was skipped.
//!
//! Usage:
//!   decode_text <log_file> [--limit <count>] [--verbose]
//!
//! Example:
//!   decode_text trace.log --limit 100 --verbose

use can_trace_decoder::{DecodeRun, DecodedSample, Decoder, SignalDictionary};
use std::env;
use std::path::PathBuf;

fn print_sample(sample: &DecodedSample, dictionary: &SignalDictionary, verbose: bool) {
    println!("[{:.6}s] {} signals", sample.timestamp, sample.values.len());

    if verbose {
        for (name, value) in sample.values.iter() {
            let unit = dictionary
                .find_signal(name)
                .first()
                .and_then(|(_, signal)| signal.unit.clone())
                .unwrap_or_default();
            println!("    {}: {:.2} {}", name, value, unit);
        }
    }
}

fn print_summary(run: &DecodeRun) {
    println!("\n=== DECODING SUMMARY ===");
    println!("Lines examined: {}", run.parse.lines_seen);
    println!("Bracketed frames: {}", run.parse.bracketed);
    println!("Delimited frames: {}", run.parse.delimited);
    println!("Malformed lines: {}", run.parse.dropped_count());
    println!("Decoded samples: {}", run.decode.decoded);
    println!("Total signals decoded: {}", run.decode.signals_decoded);
    println!("Unknown-ID frames: {}", run.decode.unknown_count());

    if !run.decode.unknown_ids.is_empty() {
        println!("\nTop 10 Unknown IDs:");
        let mut sorted: Vec<_> = run.decode.unknown_ids.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1));
        for (id, count) in sorted.iter().take(10) {
            println!("  0x{:X}: {} times", id, count);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <log_file> [--limit <count>] [--verbose]", args[0]);
        std::process::exit(1);
    }

    let log_file = PathBuf::from(&args[1]);
    let mut limit: Option<usize> = None;
    let mut verbose = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--limit" => {
                i += 1;
                if i < args.len() {
                    limit = Some(args[i].parse()?);
                }
            }
            "--verbose" | "-v" => verbose = true,
            other => eprintln!("Unknown argument: {}", other),
        }
        i += 1;
    }

    env_logger::init();

    let text = std::fs::read_to_string(&log_file)?;
    let decoder = Decoder::new(SignalDictionary::demo());
    let run = decoder.decode_text_with_report(&text);

    println!("=== CAN Trace Decoder ===");
    println!("Log file: {:?}\n", log_file);

    let shown = limit.unwrap_or(run.samples.len());
    for sample in run.samples.iter().take(shown) {
        print_sample(sample, decoder.dictionary(), verbose);
    }
    if shown < run.samples.len() {
        println!("\n... (limit of {} samples reached)", shown);
    }

    print_summary(&run);
    Ok(())
}
