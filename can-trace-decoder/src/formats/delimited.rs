//! Delimited field line parser
//!
//! Recognises comma and/or whitespace separated lines:
//!
//! ```text
//! 0.001,0x0CFF050,00,10,34,12,00,00,00,00
//! 0.002 217 1F 2E
//! ```
//!
//! Token 0 is the timestamp, token 1 the identifier (hex with a `0x` prefix,
//! decimal otherwise), and every further token one hex byte. A line is
//! accepted as a whole or not at all. Fewer than eight bytes is fine.

use crate::types::{MalformedCause, RawFrame};

/// Parse one delimited line into a frame
pub fn parse_line(line: &str) -> Result<RawFrame, MalformedCause> {
    let tokens: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.len() < 3 {
        return Err(MalformedCause::TooFewTokens);
    }

    let timestamp = parse_timestamp(tokens[0]).ok_or(MalformedCause::BadTimestamp)?;
    let id = parse_identifier(tokens[1]).ok_or(MalformedCause::BadIdentifier)?;
    let payload = tokens[2..]
        .iter()
        .map(|token| parse_byte(token).ok_or(MalformedCause::BadByte))
        .collect::<Result<Vec<u8>, _>>()?;

    Ok(RawFrame::new(timestamp, id, payload))
}

fn parse_timestamp(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|t| t.is_finite())
}

/// `0x`-prefixed tokens are hex, everything else decimal
fn parse_identifier(token: &str) -> Option<u32> {
    match token.strip_prefix("0x") {
        Some(hex) if is_hex(hex) => u32::from_str_radix(hex, 16).ok(),
        Some(_) => None,
        None if token.bytes().all(|b| b.is_ascii_digit()) => token.parse::<u32>().ok(),
        None => None,
    }
}

/// One or two hex digits
fn parse_byte(token: &str) -> Option<u8> {
    if token.len() > 2 || !is_hex(token) {
        return None;
    }
    u8::from_str_radix(token, 16).ok()
}

fn is_hex(digits: &str) -> bool {
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}
