//! Core types for the CAN trace decoder library
//!
//! This module defines the frames the parser emits, the samples the engine
//! produces, and the tags used to account for everything that was skipped on
//! the way. The decoder is stateless: none of these types carry state across
//! decode runs.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Raw CAN frame recognised in a text log
///
/// This represents a single frame as read from one log line, before any
/// signal lookup. The payload is not limited to 8 bytes; the extractor reads
/// missing bytes as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// Timestamp in seconds as written in the log
    pub timestamp: f64,
    /// CAN message ID (11-bit or 29-bit, not distinguished)
    pub id: u32,
    /// Frame data bytes
    pub payload: Vec<u8>,
}

impl RawFrame {
    /// Create a new raw frame
    pub fn new(timestamp: f64, id: u32, payload: Vec<u8>) -> Self {
        Self {
            timestamp,
            id,
            payload,
        }
    }

    /// Get the data length code (DLC) - number of data bytes
    pub fn dlc(&self) -> usize {
        self.payload.len()
    }
}

/// Errors that can occur while building a dictionary or loading configuration
///
/// Decoding itself never fails; see [`DropReason`] for the non-fatal outcomes.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Invalid signal definition: {0}")]
    InvalidSignalDefinition(String),

    #[error("Duplicate signal '{name}' in frame 0x{can_id:X}")]
    DuplicateSignal { can_id: u32, name: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Supported text line grammars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineFormat {
    /// `(seconds) bus id#payload`
    Bracketed,
    /// Comma and/or whitespace separated `timestamp id b0 b1 ...`
    Delimited,
}

impl LineFormat {
    /// Pick the grammar a line must be recognised under
    ///
    /// Any line containing `#` is bracketed, everything else is delimited.
    pub fn detect(line: &str) -> Self {
        if line.contains('#') {
            LineFormat::Bracketed
        } else {
            LineFormat::Delimited
        }
    }
}

impl fmt::Display for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineFormat::Bracketed => write!(f, "bracketed"),
            LineFormat::Delimited => write!(f, "delimited"),
        }
    }
}

/// Why a line failed to convert into a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MalformedCause {
    /// The bracketed pattern did not match
    NoMatch,
    /// Fewer than three tokens in a delimited line
    TooFewTokens,
    /// Timestamp token is not a decimal number
    BadTimestamp,
    /// Identifier is not a valid hex/decimal u32
    BadIdentifier,
    /// A payload byte is not a hex byte
    BadByte,
}

impl fmt::Display for MalformedCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MalformedCause::NoMatch => "pattern did not match",
            MalformedCause::TooFewTokens => "too few tokens",
            MalformedCause::BadTimestamp => "invalid timestamp",
            MalformedCause::BadIdentifier => "invalid identifier",
            MalformedCause::BadByte => "invalid payload byte",
        };
        f.write_str(text)
    }
}

/// Tag recorded whenever a line or frame is silently excluded
///
/// The public decode contract never surfaces these as errors; they are only
/// collected in reports and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The line matched neither grammar, or a numeric token failed to convert
    MalformedLine {
        format: LineFormat,
        cause: MalformedCause,
    },
    /// The frame ID has no entry in the signal dictionary
    UnknownFrameIdentifier(u32),
    /// The frame ID is excluded by the configured message filter
    Filtered(u32),
    /// The payload is shorter than the configured minimum
    ShortPayload { id: u32, len: usize },
}

impl DropReason {
    /// Shorthand for a malformed-line tag
    pub fn malformed(format: LineFormat, cause: MalformedCause) -> Self {
        DropReason::MalformedLine { format, cause }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MalformedLine { format, cause } => {
                write!(f, "malformed {} line: {}", format, cause)
            }
            DropReason::UnknownFrameIdentifier(id) => write!(f, "unknown frame ID 0x{:X}", id),
            DropReason::Filtered(id) => write!(f, "frame ID 0x{:X} filtered out", id),
            DropReason::ShortPayload { id, len } => {
                write!(f, "frame ID 0x{:X} has only {} payload bytes", id, len)
            }
        }
    }
}

/// Physical values of one sample, keyed by signal name
///
/// Keeps descriptor order so output columns are stable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalValues(Vec<(String, f64)>);

impl SignalValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; a name that is already present is overwritten in place
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for SignalValues {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// One decoded frame - the primary output of the decoder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecodedSample {
    /// Timestamp copied from the source frame
    pub timestamp: f64,
    /// Physical value of every signal the frame carries
    pub values: SignalValues,
}

impl DecodedSample {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            values: SignalValues::new(),
        }
    }

    /// Get a signal value by name
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name)
    }
}
