//! Configuration loading and parsing
//!
//! The config file is TOML with an optional `[decoder]` table and one
//! `[[frames]]` entry per frame ID:
//!
//! ```toml
//! [decoder]
//! message_filter = [0x0CFF050]
//!
//! [[frames]]
//! id = 0x0CFF050
//! name = "EEC1"
//!
//! [[frames.signals]]
//! name = "VehicleSpeed"
//! start = 0
//! length = 16
//! factor = 0.01
//! unit = "km/h"
//! ```

use anyhow::{bail, Context, Result};
use can_trace_decoder::{DecoderConfig, SignalDescriptor, SignalDictionary};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from a TOML file)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub frames: Vec<FrameConfig>,
}

/// Signals carried by one frame ID
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FrameConfig {
    pub id: u32,
    /// Message name, informational only
    pub name: Option<String>,
    pub signals: Vec<SignalDescriptor>,
}

impl AppConfig {
    /// Build the signal dictionary described by `[[frames]]`
    pub fn dictionary(&self) -> Result<SignalDictionary> {
        if self.frames.is_empty() {
            bail!("Configuration defines no frames");
        }

        for frame in &self.frames {
            log::debug!(
                "Frame 0x{:X} ({}): {} signals",
                frame.id,
                frame.name.as_deref().unwrap_or("unnamed"),
                frame.signals.len()
            );
        }

        let dictionary = SignalDictionary::from_frames(
            self.frames
                .iter()
                .map(|frame| (frame.id, frame.signals.clone())),
        )?;
        Ok(dictionary)
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const DEMO_CONFIG: &str = r#"
        [decoder]
        message_filter = [0x0CFF050]

        [[frames]]
        id = 0x0CFF050
        name = "EEC1"

        [[frames.signals]]
        name = "VehicleSpeed"
        start = 0
        length = 16
        factor = 0.01
        unit = "km/h"

        [[frames.signals]]
        name = "EngineRPM"
        start_bit = 16
        length = 16
        scale = 0.25
    "#;

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = toml::from_str(DEMO_CONFIG).unwrap();
        assert_eq!(config.decoder.message_filter, Some(vec![0x0CFF050]));
        assert_eq!(config.frames.len(), 1);
        assert_eq!(config.frames[0].signals[1].scale, 0.25);

        let dictionary = config.dictionary().unwrap();
        let signals = dictionary.lookup(0x0CFF050).unwrap();
        assert_eq!(signals[0].unit.as_deref(), Some("km/h"));
        assert_eq!(signals[1].start_bit, 16);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DEMO_CONFIG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.dictionary().unwrap().stats().num_signals, 2);
    }

    #[test]
    fn test_missing_file_and_bad_toml() {
        assert!(load_config(Path::new("does-not-exist.toml")).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[frames]\nid = ").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_invalid_dictionary_rejected() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.dictionary().is_err());

        let config: AppConfig = toml::from_str(
            r#"
            [[frames]]
            id = 256
            signals = [{ name = "Wide", start = 0, length = 40 }]
            "#,
        )
        .unwrap();
        let err = config.dictionary().unwrap_err();
        assert!(err.to_string().contains("Wide"));
    }
}
