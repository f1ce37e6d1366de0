//! Signal dictionary
//!
//! This module contains the in-memory frame-to-signal table the engine
//! decodes against. Loading it from files is left to the application layer.

pub mod database;

// Re-export key types for convenience
pub use database::{
    DictionaryStats, SignalDescriptor, SignalDictionary, SignalDictionaryBuilder,
    MAX_SIGNAL_LENGTH,
};
