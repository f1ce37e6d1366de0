//! Main decoder API
//!
//! [`DecodeEngine`] turns parsed frames into samples against a borrowed
//! [`SignalDictionary`]. [`Decoder`] owns a dictionary and a
//! [`DecoderConfig`] and runs the whole text-to-samples pipeline.

use crate::config::DecoderConfig;
use crate::formats::{LogParser, ParseOutcome, ParseReport};
use crate::signals::{DictionaryStats, SignalDictionary};
use crate::types::{DecodedSample, DropReason, RawFrame};
use rayon::prelude::*;
use std::borrow::Borrow;
use std::collections::BTreeMap;

/// Frame-to-sample decoder over a read-only dictionary
///
/// Cheap to create and `Copy`; any number of engines may share one dictionary.
#[derive(Debug, Clone, Copy)]
pub struct DecodeEngine<'a> {
    dictionary: &'a SignalDictionary,
}

impl<'a> DecodeEngine<'a> {
    pub fn new(dictionary: &'a SignalDictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &'a SignalDictionary {
        self.dictionary
    }

    /// Decode one frame into a sample
    ///
    /// Fails only when the frame ID is not in the dictionary. Windows that run
    /// past the payload decode with the missing bits as zero.
    pub fn decode_frame(&self, frame: &RawFrame) -> Result<DecodedSample, DropReason> {
        let signals = self
            .dictionary
            .lookup(frame.id)
            .ok_or(DropReason::UnknownFrameIdentifier(frame.id))?;

        let mut sample = DecodedSample::new(frame.timestamp);
        for signal in signals {
            sample
                .values
                .insert(signal.name.as_str(), signal.decode(&frame.payload));
        }

        log::trace!(
            "Decoded frame 0x{:X} at {}: {} signals",
            frame.id,
            frame.timestamp,
            sample.values.len()
        );
        Ok(sample)
    }

    /// Decode frames in order, skipping unknown IDs
    ///
    /// # Example
    /// ```
    /// use can_trace_decoder::{DecodeEngine, LogParser, SignalDictionary};
    ///
    /// let dictionary = SignalDictionary::demo();
    /// let frames = LogParser::parse("0.001,0x0CFF050,00,10,34,12,00,00,00,00");
    /// let samples = DecodeEngine::new(&dictionary).decode(&frames);
    ///
    /// assert_eq!(samples[0].value("VehicleSpeed"), Some(40.96));
    /// assert_eq!(samples[0].value("EngineRPM"), Some(1165.0));
    /// ```
    pub fn decode(&self, frames: &[RawFrame]) -> Vec<DecodedSample> {
        self.iter(frames).collect()
    }

    /// Lazily decode any sequence of frames
    pub fn iter<I>(&self, frames: I) -> DecodingIterator<'a, I::IntoIter>
    where
        I: IntoIterator,
        I::Item: Borrow<RawFrame>,
    {
        DecodingIterator {
            frames: frames.into_iter(),
            engine: *self,
        }
    }

    /// Decode frames in order and account for every skipped frame
    pub fn decode_with_report(&self, frames: &[RawFrame]) -> DecodeOutcome {
        let results = frames.iter().map(|frame| self.decode_frame(frame));
        DecodeOutcome::collect(results)
    }

    /// Decode frames on the rayon pool
    ///
    /// Produces exactly what [`decode`](Self::decode) produces; the collect
    /// keeps input order.
    pub fn decode_parallel(&self, frames: &[RawFrame]) -> Vec<DecodedSample> {
        frames
            .par_iter()
            .filter_map(|frame| self.decode_frame(frame).ok())
            .collect()
    }

    /// Parallel variant of [`decode_with_report`](Self::decode_with_report)
    pub fn decode_parallel_with_report(&self, frames: &[RawFrame]) -> DecodeOutcome {
        let results: Vec<Result<DecodedSample, DropReason>> = frames
            .par_iter()
            .map(|frame| self.decode_frame(frame))
            .collect();
        DecodeOutcome::collect(results)
    }
}

/// Decode frames against a dictionary, skipping unknown IDs
pub fn decode(frames: &[RawFrame], dictionary: &SignalDictionary) -> Vec<DecodedSample> {
    DecodeEngine::new(dictionary).decode(frames)
}

/// Iterator that decodes frames into samples
///
/// Frames whose ID is not in the dictionary are skipped.
pub struct DecodingIterator<'a, I> {
    frames: I,
    engine: DecodeEngine<'a>,
}

impl<'a, I> Iterator for DecodingIterator<'a, I>
where
    I: Iterator,
    I::Item: Borrow<RawFrame>,
{
    type Item = DecodedSample;

    fn next(&mut self) -> Option<Self::Item> {
        for frame in self.frames.by_ref() {
            match self.engine.decode_frame(frame.borrow()) {
                Ok(sample) => return Some(sample),
                Err(reason) => log::trace!("Skipping frame: {}", reason),
            }
        }
        None
    }
}

/// Bookkeeping for one decode run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeReport {
    /// Frames offered to the decode stage
    pub frames_seen: usize,
    /// Frames that produced a sample
    pub decoded: usize,
    /// Signal values computed across all samples
    pub signals_decoded: usize,
    /// Frames dropped by the message filter
    pub filtered: usize,
    /// Frames dropped for a short payload
    pub short_payload: usize,
    /// Unknown frame IDs and how often each was seen
    pub unknown_ids: BTreeMap<u32, usize>,
}

impl DecodeReport {
    pub fn record_sample(&mut self, sample: &DecodedSample) {
        self.frames_seen += 1;
        self.decoded += 1;
        self.signals_decoded += sample.values.len();
    }

    pub fn record_drop(&mut self, reason: DropReason) {
        self.frames_seen += 1;
        match reason {
            DropReason::UnknownFrameIdentifier(id) => {
                *self.unknown_ids.entry(id).or_insert(0) += 1;
            }
            DropReason::Filtered(_) => self.filtered += 1,
            DropReason::ShortPayload { .. } => self.short_payload += 1,
            DropReason::MalformedLine { .. } => {
                log::warn!("Malformed line reported to decode stage: {}", reason);
            }
        }
    }

    /// Total number of frames with an unknown ID
    pub fn unknown_count(&self) -> usize {
        self.unknown_ids.values().sum()
    }

    /// Total number of frames that produced no sample
    pub fn dropped_count(&self) -> usize {
        self.frames_seen - self.decoded
    }
}

/// Samples plus the report describing how they were obtained
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOutcome {
    pub samples: Vec<DecodedSample>,
    pub report: DecodeReport,
}

impl DecodeOutcome {
    fn collect<I>(results: I) -> Self
    where
        I: IntoIterator<Item = Result<DecodedSample, DropReason>>,
    {
        let mut outcome = Self::default();
        for result in results {
            match result {
                Ok(sample) => {
                    outcome.report.record_sample(&sample);
                    outcome.samples.push(sample);
                }
                Err(reason) => outcome.report.record_drop(reason),
            }
        }
        outcome
    }
}

/// Result of a full text-to-samples run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeRun {
    pub samples: Vec<DecodedSample>,
    pub parse: ParseReport,
    pub decode: DecodeReport,
}

impl DecodeRun {
    /// The most recent sample, if anything decoded
    pub fn latest(&self) -> Option<&DecodedSample> {
        self.samples.last()
    }
}

/// The main decoder struct - owns a dictionary and runs the full pipeline
pub struct Decoder {
    dictionary: SignalDictionary,
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with default configuration
    pub fn new(dictionary: SignalDictionary) -> Self {
        Self {
            dictionary,
            config: DecoderConfig::default(),
        }
    }

    /// Builder method: replace the configuration
    pub fn with_config(mut self, config: DecoderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    pub fn dictionary(&self) -> &SignalDictionary {
        &self.dictionary
    }

    /// Get statistics about the loaded dictionary
    pub fn dictionary_stats(&self) -> DictionaryStats {
        self.dictionary.stats()
    }

    /// Parse and decode log text
    ///
    /// # Example
    /// ```
    /// use can_trace_decoder::{Decoder, SignalDictionary};
    ///
    /// let decoder = Decoder::new(SignalDictionary::demo());
    /// let samples = decoder.decode_text("(0.5) can0 0CFF050#00103412\n0.4,0x7FF,00");
    /// assert_eq!(samples.len(), 1);
    /// assert_eq!(samples[0].timestamp, 0.5);
    /// ```
    pub fn decode_text(&self, text: &str) -> Vec<DecodedSample> {
        self.decode_text_with_report(text).samples
    }

    /// Parse and decode log text, keeping both stage reports
    pub fn decode_text_with_report(&self, text: &str) -> DecodeRun {
        let ParseOutcome {
            frames,
            report: parse_report,
        } = LogParser::parse_with_report(text);
        let mut filter_report = DecodeReport::default();

        let admitted: Vec<RawFrame> = frames
            .into_iter()
            .filter(|frame| match self.config.admit(frame) {
                Ok(()) => true,
                Err(reason) => {
                    log::debug!("Dropping frame at {}: {}", frame.timestamp, reason);
                    filter_report.record_drop(reason);
                    false
                }
            })
            .collect();

        let engine = DecodeEngine::new(&self.dictionary);
        let outcome = if self.config.parallel {
            engine.decode_parallel_with_report(&admitted)
        } else {
            engine.decode_with_report(&admitted)
        };

        let mut decode = outcome.report;
        decode.frames_seen += filter_report.frames_seen;
        decode.filtered += filter_report.filtered;
        decode.short_payload += filter_report.short_payload;

        log::info!(
            "Decoded {} samples from {} frames ({} malformed lines, {} unknown-ID frames)",
            decode.decoded,
            parse_report.frames(),
            parse_report.dropped_count(),
            decode.unknown_count()
        );

        DecodeRun {
            samples: outcome.samples,
            parse: parse_report,
            decode,
        }
    }
}
