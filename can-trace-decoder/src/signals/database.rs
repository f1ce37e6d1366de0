//! Signal dictionary
//!
//! Maps a frame identifier to the ordered list of signals it carries. The
//! dictionary is validated once at construction and is read-only afterwards,
//! so any number of decode runs may borrow it at the same time.

use crate::extractor::SignalExtractor;
use crate::types::{DecoderError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Widest bit window a descriptor may declare
pub const MAX_SIGNAL_LENGTH: u16 = 32;

/// A signal definition: a little-endian bit window plus linear scaling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDescriptor {
    /// Signal name
    pub name: String,
    /// First (least significant) bit of the window, counted from bit 0 of byte 0
    #[serde(alias = "start")]
    pub start_bit: u16,
    /// Length in bits (1..=32)
    pub length: u16,
    /// Scale factor to convert raw value to physical value
    #[serde(alias = "factor", default = "default_scale")]
    pub scale: f64,
    /// Offset to add after scaling
    #[serde(default)]
    pub offset: f64,
    /// Engineering unit (e.g., "km/h", "rpm")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

fn default_scale() -> f64 {
    1.0
}

impl SignalDescriptor {
    /// Create an unscaled descriptor; chain `with_scaling` / `with_unit` as needed
    pub fn new(name: impl Into<String>, start_bit: u16, length: u16) -> Self {
        Self {
            name: name.into(),
            start_bit,
            length,
            scale: 1.0,
            offset: 0.0,
            unit: None,
        }
    }

    pub fn with_scaling(mut self, scale: f64, offset: f64) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    /// Raw (unscaled) value of this signal in a payload
    pub fn raw_value(&self, payload: &[u8]) -> u64 {
        SignalExtractor::extract_raw(payload, self.start_bit, self.length)
    }

    /// Physical value of this signal in a payload
    pub fn decode(&self, payload: &[u8]) -> f64 {
        SignalExtractor::physical_value(self.raw_value(payload), self.scale, self.offset)
    }

    /// Check the invariants the dictionary relies on
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(DecoderError::InvalidSignalDefinition(
                "signal name must not be empty".to_string(),
            ));
        }
        if self.length == 0 || self.length > MAX_SIGNAL_LENGTH {
            return Err(DecoderError::InvalidSignalDefinition(format!(
                "signal '{}' has length {} (expected 1..={})",
                self.name, self.length, MAX_SIGNAL_LENGTH
            )));
        }
        Ok(())
    }
}

/// Immutable lookup table from frame ID to signal descriptors
#[derive(Debug, Clone, Default)]
pub struct SignalDictionary {
    /// Key: CAN ID, Value: signals in declaration order
    frames: HashMap<u32, Vec<SignalDescriptor>>,
}

impl SignalDictionary {
    /// Start building a dictionary
    pub fn builder() -> SignalDictionaryBuilder {
        SignalDictionaryBuilder::default()
    }

    /// Build a dictionary from `(id, descriptors)` pairs
    ///
    /// Descriptors for an ID that appears twice are appended in order.
    pub fn from_frames<I>(frames: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u32, Vec<SignalDescriptor>)>,
    {
        frames
            .into_iter()
            .fold(Self::builder(), |builder, (id, signals)| {
                builder.frame(id, signals)
            })
            .build()
    }

    /// The demo table: one J1939-style frame carrying vehicle speed and engine speed
    pub fn demo() -> Self {
        let mut frames = HashMap::new();
        frames.insert(
            0x0CFF050,
            vec![
                SignalDescriptor::new("VehicleSpeed", 0, 16)
                    .with_scaling(0.01, 0.0)
                    .with_unit("km/h"),
                SignalDescriptor::new("EngineRPM", 16, 16)
                    .with_scaling(0.25, 0.0)
                    .with_unit("rpm"),
            ],
        );
        Self { frames }
    }

    /// Get the signals carried by a frame ID
    pub fn lookup(&self, can_id: u32) -> Option<&[SignalDescriptor]> {
        self.frames.get(&can_id).map(Vec::as_slice)
    }

    pub fn contains(&self, can_id: u32) -> bool {
        self.frames.contains_key(&can_id)
    }

    /// Find every frame carrying a signal with this name
    pub fn find_signal(&self, signal_name: &str) -> Vec<(u32, &SignalDescriptor)> {
        let mut found: Vec<(u32, &SignalDescriptor)> = self
            .frames
            .iter()
            .flat_map(|(id, signals)| {
                signals
                    .iter()
                    .filter(|signal| signal.name == signal_name)
                    .map(move |signal| (*id, signal))
            })
            .collect();
        found.sort_by_key(|(id, _)| *id);
        found
    }

    /// Get all CAN IDs in the dictionary, ascending
    pub fn ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.frames.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get dictionary statistics
    pub fn stats(&self) -> DictionaryStats {
        DictionaryStats {
            num_frames: self.frames.len(),
            num_signals: self.frames.values().map(Vec::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Dictionary statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictionaryStats {
    /// Number of frame IDs with signal definitions
    pub num_frames: usize,
    /// Total number of signal definitions
    pub num_signals: usize,
}

/// Collects frame definitions and validates them into a [`SignalDictionary`]
#[derive(Debug, Default)]
pub struct SignalDictionaryBuilder {
    frames: HashMap<u32, Vec<SignalDescriptor>>,
}

impl SignalDictionaryBuilder {
    /// Add signals for a frame ID (appends if the ID is already present)
    pub fn frame(mut self, can_id: u32, signals: impl IntoIterator<Item = SignalDescriptor>) -> Self {
        self.frames.entry(can_id).or_default().extend(signals);
        self
    }

    /// Add a single signal to a frame ID
    pub fn signal(self, can_id: u32, signal: SignalDescriptor) -> Self {
        self.frame(can_id, std::iter::once(signal))
    }

    /// Validate every descriptor and freeze the dictionary
    pub fn build(self) -> Result<SignalDictionary> {
        for (can_id, signals) in &self.frames {
            if signals.is_empty() {
                return Err(DecoderError::InvalidSignalDefinition(format!(
                    "frame 0x{:X} has no signals",
                    can_id
                )));
            }

            for (index, signal) in signals.iter().enumerate() {
                signal.validate()?;
                if signals[..index].iter().any(|other| other.name == signal.name) {
                    return Err(DecoderError::DuplicateSignal {
                        can_id: *can_id,
                        name: signal.name.clone(),
                    });
                }
            }
        }

        let dictionary = SignalDictionary {
            frames: self.frames,
        };
        let stats = dictionary.stats();
        log::debug!(
            "Signal dictionary built: {} frames, {} signals",
            stats.num_frames,
            stats.num_signals
        );
        Ok(dictionary)
    }
}
