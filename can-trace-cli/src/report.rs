//! Output rendering
//!
//! Renders decoded samples as an aligned text table, CSV or JSON, plus the
//! latest-sample summary and the drop report.

use anyhow::Result;
use can_trace_decoder::{DecodeRun, DecodedSample, SignalDictionary};
use clap::ValueEnum;
use std::io::Write;

/// Output formats for decoded samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

/// One output column: a signal name and its unit, if the dictionary knows it
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub unit: Option<String>,
}

impl Column {
    fn header(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} [{}]", self.name, unit),
            None => self.name.clone(),
        }
    }
}

/// Collect signal columns in first-appearance order
pub fn columns(samples: &[DecodedSample], dictionary: &SignalDictionary) -> Vec<Column> {
    let mut columns: Vec<Column> = Vec::new();
    for sample in samples {
        for name in sample.values.names() {
            if columns.iter().any(|column| column.name == name) {
                continue;
            }
            let unit = dictionary
                .find_signal(name)
                .into_iter()
                .find_map(|(_, signal)| signal.unit.clone());
            columns.push(Column {
                name: name.to_string(),
                unit,
            });
        }
    }
    columns
}

/// Write samples in the requested format
pub fn render<W: Write>(
    out: &mut W,
    format: OutputFormat,
    samples: &[DecodedSample],
    dictionary: &SignalDictionary,
) -> Result<()> {
    match format {
        OutputFormat::Table => render_table(out, samples, &columns(samples, dictionary)),
        OutputFormat::Csv => render_csv(out, samples, &columns(samples, dictionary)),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, samples)?;
            writeln!(out)?;
            Ok(())
        }
    }
}

/// Aligned text table, three decimals for time and two for values
pub fn render_table<W: Write>(out: &mut W, samples: &[DecodedSample], columns: &[Column]) -> Result<()> {
    let headers: Vec<String> = columns.iter().map(Column::header).collect();
    let widths: Vec<usize> = headers.iter().map(|h| h.len().max(10)).collect();

    write!(out, "{:>10}", "t")?;
    for (header, width) in headers.iter().zip(&widths) {
        write!(out, "  {:>width$}", header, width = width)?;
    }
    writeln!(out)?;

    for sample in samples {
        write!(out, "{:>10.3}", sample.timestamp)?;
        for (column, width) in columns.iter().zip(&widths) {
            match sample.value(&column.name) {
                Some(value) => write!(out, "  {:>width$.2}", value, width = width)?,
                None => write!(out, "  {:>width$}", "-", width = width)?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// CSV with full precision; missing values are empty fields
pub fn render_csv<W: Write>(out: &mut W, samples: &[DecodedSample], columns: &[Column]) -> Result<()> {
    let mut header = vec!["timestamp".to_string()];
    header.extend(columns.iter().map(|column| csv_field(&column.name)));
    writeln!(out, "{}", header.join(","))?;

    for sample in samples {
        let mut row = vec![sample.timestamp.to_string()];
        row.extend(columns.iter().map(|column| {
            sample
                .value(&column.name)
                .map(|value| value.to_string())
                .unwrap_or_default()
        }));
        writeln!(out, "{}", row.join(","))?;
    }
    Ok(())
}

fn csv_field(text: &str) -> String {
    if text.contains([',', '"', '\n']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Field-per-line view of the most recent sample
pub fn render_latest<W: Write>(
    out: &mut W,
    sample: Option<&DecodedSample>,
    dictionary: &SignalDictionary,
) -> Result<()> {
    let Some(sample) = sample else {
        writeln!(out, "No frames decoded")?;
        return Ok(());
    };

    writeln!(out, "Latest sample at t = {:.3}", sample.timestamp)?;
    for column in columns(std::slice::from_ref(sample), dictionary) {
        let value = sample.value(&column.name).unwrap_or_default();
        match &column.unit {
            Some(unit) => writeln!(out, "  {}: {:.2} {}", column.name, value, unit)?,
            None => writeln!(out, "  {}: {:.2}", column.name, value)?,
        }
    }
    Ok(())
}

/// Counts from both pipeline stages
pub fn render_summary<W: Write>(out: &mut W, run: &DecodeRun) -> Result<()> {
    writeln!(out, "Decoded {} frames.", run.samples.len())?;
    writeln!(
        out,
        "  Lines: {} ({} bracketed, {} delimited, {} malformed)",
        run.parse.lines_seen,
        run.parse.bracketed,
        run.parse.delimited,
        run.parse.dropped_count()
    )?;
    writeln!(
        out,
        "  Frames: {} seen, {} unknown ID, {} filtered, {} short payload",
        run.decode.frames_seen,
        run.decode.unknown_count(),
        run.decode.filtered,
        run.decode.short_payload
    )?;

    for dropped in &run.parse.dropped {
        writeln!(out, "  line {}: {}", dropped.line_number, dropped.reason)?;
    }
    for (id, count) in &run.decode.unknown_ids {
        writeln!(out, "  unknown ID 0x{:X}: {} frames", id, count)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use can_trace_decoder::Decoder;

    fn demo_run(text: &str) -> (DecodeRun, SignalDictionary) {
        let decoder = Decoder::new(SignalDictionary::demo());
        let run = decoder.decode_text_with_report(text);
        (run, decoder.dictionary().clone())
    }

    fn to_string<F>(render: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> Result<()>,
    {
        let mut buf = Vec::new();
        render(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_columns_carry_units() {
        let (run, dictionary) = demo_run("0.001,0x0CFF050,00,10,34,12");
        let columns = columns(&run.samples, &dictionary);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].header(), "VehicleSpeed [km/h]");
        assert_eq!(columns[1].header(), "EngineRPM [rpm]");
    }

    #[test]
    fn test_render_csv() {
        let (run, dictionary) = demo_run("0.001,0x0CFF050,00,10,34,12");
        let text = to_string(|out| render(out, OutputFormat::Csv, &run.samples, &dictionary));
        assert_eq!(text, "timestamp,VehicleSpeed,EngineRPM\n0.001,40.96,1165\n");
    }

    #[test]
    fn test_render_table() {
        let (run, dictionary) = demo_run("0.001,0x0CFF050,00,10,34,12");
        let text = to_string(|out| render(out, OutputFormat::Table, &run.samples, &dictionary));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("VehicleSpeed [km/h]"));
        assert!(lines[1].trim_start().starts_with("0.001"));
        assert!(lines[1].contains("40.96"));
        assert!(lines[1].contains("1165.00"));
    }

    #[test]
    fn test_render_json() {
        let (run, dictionary) = demo_run("(0.001) can0 0CFF050#00103412");
        let text = to_string(|out| render(out, OutputFormat::Json, &run.samples, &dictionary));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["values"]["EngineRPM"], 1165.0);
    }

    #[test]
    fn test_render_latest() {
        let (run, dictionary) = demo_run("0.1,0x0CFF050,00,10\n0.2,0x0CFF050,00,20");
        let text = to_string(|out| render_latest(out, run.latest(), &dictionary));
        assert!(text.starts_with("Latest sample at t = 0.200"));
        assert!(text.contains("VehicleSpeed: 81.92 km/h"));

        let text = to_string(|out| render_latest(out, None, &dictionary));
        assert_eq!(text, "No frames decoded\n");
    }

    #[test]
    fn test_render_summary() {
        let (run, _) = demo_run("0.1,0x0CFF050,00\nbad line here\n0.2,0x123,00");
        let text = to_string(|out| render_summary(out, &run));
        assert!(text.starts_with("Decoded 1 frames."));
        assert!(text.contains("line 2: malformed delimited line: invalid timestamp"));
        assert!(text.contains("unknown ID 0x123: 1 frames"));
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
