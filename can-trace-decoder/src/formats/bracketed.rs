//! Bracketed trace line parser
//!
//! Recognises the candump-style line shape:
//!
//! ```text
//! (1623334411.123456) can0 0CFF050#0010341200000000
//! ```
//!
//! The timestamp is decimal seconds, the bus name is any non-space token, the
//! identifier is hex without prefix and the payload is a contiguous hex string
//! decoded two characters at a time. An odd trailing character is ignored, as
//! is anything following the payload.

use crate::types::{MalformedCause, RawFrame};
use regex::Regex;
use std::sync::LazyLock;

static BRACKETED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(([0-9.]+)\)\s+\S+\s+([0-9A-Fa-f]+)#([0-9A-Fa-f]+)")
        .expect("Invalid regex pattern")
});

/// Parse one bracketed trace line into a frame
pub fn parse_line(line: &str) -> Result<RawFrame, MalformedCause> {
    let caps = BRACKETED_LINE
        .captures(line)
        .ok_or(MalformedCause::NoMatch)?;

    let timestamp = caps[1]
        .parse::<f64>()
        .map_err(|_| MalformedCause::BadTimestamp)?;

    let id = u32::from_str_radix(&caps[2], 16).map_err(|_| MalformedCause::BadIdentifier)?;

    let payload = decode_hex_payload(&caps[3])?;

    Ok(RawFrame::new(timestamp, id, payload))
}

/// Decode a contiguous hex string into bytes, two characters per byte
fn decode_hex_payload(hex: &str) -> Result<Vec<u8>, MalformedCause> {
    hex.as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or(MalformedCause::BadByte)
        })
        .collect()
}
