//! Codec configuration, stored as JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Bytes of packed payload expanded per `extract` call.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Serializable codec configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CodecConfig {
    /// Encode 0x03 bytes found in the input instead of rejecting them.
    ///
    /// Decoding stops at the first such byte, so data after it is lost.
    #[serde(default)]
    pub allow_sentinel_in_input: bool,

    /// Payload bytes read per chunk when decoding
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Decode the freshly written file and compare it with the input
    #[serde(default)]
    pub verify: bool,

    /// Version information
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            allow_sentinel_in_input: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            verify: false,
            version: default_version(),
        }
    }
}

impl CodecConfig {
    /// Load a configuration from a JSON file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("couldn't read config file {}", path.display()))?;
        let mut config: CodecConfig =
            serde_json::from_str(&text).with_context(|| format!("config file {} is not valid", path.display()))?;
        if config.chunk_size == 0 {
            config.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("couldn't write config file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());
    }

    #[test]
    fn partial_override() {
        let config: CodecConfig = serde_json::from_str(r#"{ "verify": true, "chunk_size": 16 }"#).unwrap();
        assert!(config.verify);
        assert_eq!(config.chunk_size, 16);
        assert!(!config.allow_sentinel_in_input);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("huffpack-config-{}.json", std::process::id()));
        let config = CodecConfig {
            allow_sentinel_in_input: true,
            chunk_size: 0,
            ..CodecConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = CodecConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert!(loaded.allow_sentinel_in_input);
        // a zero chunk size can never make progress, so it falls back to the default
        assert_eq!(loaded.chunk_size, DEFAULT_CHUNK_SIZE);
    }
}
