//! CAN Trace Decoder Library
//!
//! A stateless, reusable library for decoding textual CAN traffic logs with an
//! in-memory signal dictionary.
//!
//! # Architecture
//!
//! The pipeline runs in one direction, leaves first:
//! - [`LogParser`] turns log text into timestamp-ordered [`RawFrame`]s, accepting
//!   bracketed (`(t) bus id#payload`) and delimited (`t,id,b0,b1,...`) lines
//! - [`SignalDictionary`] maps a frame ID to its [`SignalDescriptor`]s
//! - [`SignalExtractor`] reads a little-endian bit window and scales it
//! - [`DecodeEngine`] emits one [`DecodedSample`] per frame with a known ID
//!
//! Nothing fails at decode time. Malformed lines and unknown frame IDs are
//! skipped and accounted for as [`DropReason`]s in the parse and decode
//! reports. Errors only arise while building a dictionary.
//!
//! The library does NOT:
//! - Load signal databases from DBC/ARXML files
//! - Check decoded values for physical plausibility
//! - Persist decoded data
//!
//! # Example Usage
//!
//! ```
//! use can_trace_decoder::{Decoder, DecoderConfig, SignalDescriptor, SignalDictionary};
//!
//! let dictionary = SignalDictionary::builder()
//!     .frame(
//!         0x0CFF050,
//!         vec![
//!             SignalDescriptor::new("VehicleSpeed", 0, 16).with_scaling(0.01, 0.0),
//!             SignalDescriptor::new("EngineRPM", 16, 16).with_scaling(0.25, 0.0),
//!         ],
//!     )
//!     .build()
//!     .unwrap();
//!
//! let decoder = Decoder::new(dictionary).with_config(DecoderConfig::new());
//! let run = decoder.decode_text_with_report(
//!     "0.001,0x0CFF050,00,10,34,12,00,00,00,00\n0.002,0x0CFF050,00,GG",
//! );
//!
//! assert_eq!(run.samples.len(), 1);
//! assert_eq!(run.samples[0].value("VehicleSpeed"), Some(40.96));
//! assert_eq!(run.parse.dropped_count(), 1);
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod extractor;
pub mod formats;
pub mod signals;
pub mod types;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::{
    decode, DecodeEngine, DecodeOutcome, DecodeReport, DecodeRun, Decoder, DecodingIterator,
};
pub use extractor::SignalExtractor;
pub use formats::{parse, parse_line, DroppedLine, LogParser, ParseOutcome, ParseReport};
pub use signals::{DictionaryStats, SignalDescriptor, SignalDictionary, SignalDictionaryBuilder};
pub use types::{
    DecodedSample, DecoderError, DropReason, LineFormat, MalformedCause, RawFrame, Result,
    SignalValues,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
