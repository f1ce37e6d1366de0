//! Decoder configuration types
//!
//! This module defines the few knobs the decoder facade honours. The defaults
//! reproduce the plain parse-then-decode pipeline exactly; every option only
//! narrows what gets decoded or changes how the work is scheduled.

use crate::extractor::SignalExtractor;
use crate::signals::SignalDescriptor;
use crate::types::{DecoderError, DropReason, RawFrame};
use serde::{Deserialize, Serialize};

/// Configuration for the [`Decoder`](crate::Decoder) facade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Optional: only decode these specific CAN message IDs
    #[serde(default)]
    pub message_filter: Option<Vec<u32>>,

    /// Optional: drop frames with fewer payload bytes than this
    ///
    /// Unset by default, in which case short payloads are decoded with the
    /// missing bytes read as zero.
    #[serde(default)]
    pub min_payload_len: Option<usize>,

    /// Decode frames on the rayon thread pool
    #[serde(default)]
    pub parallel: bool,
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set message filter
    pub fn with_message_filter(mut self, messages: Vec<u32>) -> Self {
        self.message_filter = Some(messages);
        self
    }

    /// Builder method: require a minimum payload length
    pub fn with_min_payload_len(mut self, len: usize) -> Self {
        self.min_payload_len = Some(len);
        self
    }

    /// Builder method: require every listed signal window to be fully present
    pub fn with_full_windows(mut self, signals: &[SignalDescriptor]) -> Self {
        let needed = signals
            .iter()
            .map(|signal| SignalExtractor::required_bytes(signal.start_bit, signal.length))
            .max()
            .unwrap_or(0);
        self.min_payload_len = Some(needed);
        self
    }

    /// Builder method: enable parallel decoding
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Reject settings that would silently decode nothing
    pub fn validate(&self) -> crate::types::Result<()> {
        if matches!(&self.message_filter, Some(ids) if ids.is_empty()) {
            return Err(DecoderError::ConfigError(
                "message filter is present but lists no IDs".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if a message ID should be processed
    pub fn should_process_message(&self, can_id: u32) -> bool {
        match &self.message_filter {
            Some(messages) => messages.contains(&can_id),
            None => true,
        }
    }

    /// Check a frame against every configured filter
    pub fn admit(&self, frame: &RawFrame) -> Result<(), DropReason> {
        if !self.should_process_message(frame.id) {
            return Err(DropReason::Filtered(frame.id));
        }
        match self.min_payload_len {
            Some(min) if frame.dlc() < min => Err(DropReason::ShortPayload {
                id: frame.id,
                len: frame.dlc(),
            }),
            _ => Ok(()),
        }
    }
}
