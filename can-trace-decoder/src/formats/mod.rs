//! Text log line parsers
//!
//! This module turns a newline-delimited log into an ordered list of frames.
//! Each line is recognised under exactly one grammar (see [`LineFormat::detect`]);
//! lines that fail are dropped and recorded in the [`ParseReport`].

use crate::types::{DropReason, LineFormat, RawFrame};
use std::cmp::Ordering;

pub mod bracketed;
pub mod delimited;

/// Parse a single log line under the grammar it belongs to
pub fn parse_line(line: &str) -> Result<RawFrame, DropReason> {
    let format = LineFormat::detect(line);
    let parsed = match format {
        LineFormat::Bracketed => bracketed::parse_line(line),
        LineFormat::Delimited => delimited::parse_line(line),
    };
    parsed.map_err(|cause| DropReason::malformed(format, cause))
}

/// A line that produced no frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedLine {
    /// 1-based line number in the input text
    pub line_number: usize,
    pub reason: DropReason,
}

/// Bookkeeping for one parse run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    /// Non-empty lines examined
    pub lines_seen: usize,
    /// Frames recognised under the bracketed grammar
    pub bracketed: usize,
    /// Frames recognised under the delimited grammar
    pub delimited: usize,
    /// Every line that was dropped, in input order
    pub dropped: Vec<DroppedLine>,
}

impl ParseReport {
    /// Total number of frames produced
    pub fn frames(&self) -> usize {
        self.bracketed + self.delimited
    }

    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Frames plus the report describing how they were obtained
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    pub frames: Vec<RawFrame>,
    pub report: ParseReport,
}

/// Log text parser
///
/// Stateless: every call is independent. Parsing never fails; the worst case
/// is an empty frame list.
pub struct LogParser;

impl LogParser {
    /// Parse log text into frames sorted by ascending timestamp
    ///
    /// # Example
    /// ```
    /// use can_trace_decoder::LogParser;
    ///
    /// let frames = LogParser::parse("0.2,0x100,01\n(0.1) can0 100#02\nnot a frame");
    /// assert_eq!(frames.len(), 2);
    /// assert_eq!(frames[0].payload, vec![0x02]);
    /// ```
    pub fn parse(text: &str) -> Vec<RawFrame> {
        Self::parse_with_report(text).frames
    }

    /// Parse log text and keep track of every dropped line
    pub fn parse_with_report(text: &str) -> ParseOutcome {
        let mut frames = Vec::new();
        let mut report = ParseReport::default();

        for (index, line) in text.split('\n').enumerate() {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                continue;
            }
            report.lines_seen += 1;

            match parse_line(line) {
                Ok(frame) => {
                    match LineFormat::detect(line) {
                        LineFormat::Bracketed => report.bracketed += 1,
                        LineFormat::Delimited => report.delimited += 1,
                    }
                    frames.push(frame);
                }
                Err(reason) => {
                    log::trace!("Dropping line {}: {}", index + 1, reason);
                    report.dropped.push(DroppedLine {
                        line_number: index + 1,
                        reason,
                    });
                }
            }
        }

        // Stable: equal timestamps keep their input order
        frames.sort_by(|a, b| {
            a.timestamp
                .partial_cmp(&b.timestamp)
                .unwrap_or(Ordering::Equal)
        });

        log::debug!(
            "Parsed {} frames from {} lines ({} dropped)",
            report.frames(),
            report.lines_seen,
            report.dropped_count()
        );

        ParseOutcome { frames, report }
    }
}

/// Parse log text into timestamp-ordered frames
pub fn parse(text: &str) -> Vec<RawFrame> {
    LogParser::parse(text)
}
