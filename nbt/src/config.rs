//! JSON configuration for readers, SNBT settings and the default compression.
//!
//! Every field is optional. The file
//!
//! ```json
//! { "reader": { "depth_limit": 64 }, "compression": "auto" }
//! ```
//!
//! lowers the depth limit, detects compression when reading, and leaves everything else at its default.

use std::{fs, io, path::Path};

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    io::{Compression, DEFAULT_DEPTH_LIMIT, DEFAULT_SIZE_LIMIT},
    option::{
        OptionState,
        READ_DEPTH_LIMIT,
        READ_SIZE_LIMIT,
        SNBT_ACCEPT_LEGACY,
        SNBT_EMIT_LEGACY,
        SNBT_INDENT,
        SNBT_INDENT_TAB,
    },
};

/// Limits applied when reading binary NBT.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    /// The maximum number of decompressed bytes, or zero for no limit.
    pub size_limit: u64,
    /// The maximum nesting depth.
    pub depth_limit: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            size_limit: DEFAULT_SIZE_LIMIT,
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }
}

/// Settings for reading and writing SNBT.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct SnbtConfig {
    /// Spaces per indentation level, or zero for compact output.
    pub indent: u32,
    /// Whether to indent with tabs.
    pub indent_tab: bool,
    /// Whether to write legacy list indices.
    pub emit_legacy: bool,
    /// Whether to accept legacy list indices.
    pub accept_legacy: bool,
}

/// The compression used for files unless told otherwise.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    /// Uncompressed.
    None,
    /// Gzip, the usual compression of NBT files.
    Gzip,
    /// Zlib.
    Zlib,
    /// Detect the compression of input from its header, and write gzip.
    Auto,
}

impl Default for CompressionMode {
    fn default() -> Self {
        CompressionMode::Auto
    }
}

impl CompressionMode {
    /// Resolves the compression of an input whose first bytes are given.
    pub fn for_input(self, header: &[u8]) -> Compression {
        match self {
            CompressionMode::None => Compression::None,
            CompressionMode::Gzip => Compression::Gzip,
            CompressionMode::Zlib => Compression::Zlib,
            CompressionMode::Auto => Compression::detect(header),
        }
    }

    /// Resolves the compression of an output.
    pub fn for_output(self) -> Compression {
        match self {
            CompressionMode::None => Compression::None,
            CompressionMode::Zlib => Compression::Zlib,
            CompressionMode::Gzip | CompressionMode::Auto => Compression::Gzip,
        }
    }
}

/// The full configuration file.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(default, deny_unknown_fields)]
pub struct NbtConfig {
    /// Binary reader limits.
    pub reader: ReaderConfig,
    /// SNBT settings.
    pub snbt: SnbtConfig,
    /// The default compression.
    pub compression: CompressionMode,
}

impl NbtConfig {
    /// Converts this configuration into option state. Every option is assigned explicitly, so the
    /// state can be layered under environment overrides with [`values`](crate::option::OptionStateBuilder::values).
    pub fn option_state(&self) -> OptionState {
        OptionState::builder()
            .value(&READ_SIZE_LIMIT, self.reader.size_limit)
            .value(&READ_DEPTH_LIMIT, self.reader.depth_limit)
            .value(&SNBT_INDENT, self.snbt.indent)
            .value(&SNBT_INDENT_TAB, self.snbt.indent_tab)
            .value(&SNBT_EMIT_LEGACY, self.snbt.emit_legacy)
            .value(&SNBT_ACCEPT_LEGACY, self.snbt.accept_legacy)
            .build()
    }

    /// Returns this configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, NbtConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// An error raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum NbtConfigError {
    /// The file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    /// The file was not a valid configuration.
    #[error("invalid config file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses a configuration from JSON.
pub fn parse_config(json: &str) -> Result<NbtConfig, NbtConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Loads the configuration file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<NbtConfig, NbtConfigError> {
    let path = path.as_ref();
    debug!("Loading NBT config from {}", path.display());
    parse_config(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_default() {
        let config = parse_config("{}").expect("Failed to parse empty config");
        assert_eq!(config, NbtConfig::default());
        assert_eq!(config.reader.size_limit, 2 * 1024 * 1024);
        assert_eq!(config.compression, CompressionMode::Auto);

        let config = parse_config(r#"{"reader": {"depth_limit": 8}, "snbt": {"indent": 2}}"#)
            .expect("Failed to parse config");
        assert_eq!(config.reader.depth_limit, 8);
        assert_eq!(config.reader.size_limit, DEFAULT_SIZE_LIMIT);
        assert_eq!(config.snbt.indent, 2);
    }

    #[test]
    fn compression_names() {
        let config = parse_config(r#"{"compression": "zlib"}"#).expect("Failed to parse config");
        assert_eq!(config.compression.for_output(), Compression::Zlib);
        assert!(parse_config(r#"{"compression": "lz4"}"#).is_err());
        assert!(parse_config(r#"{"reader": {"limit": 1}}"#).is_err());

        assert_eq!(CompressionMode::Auto.for_input(&[0x1F, 0x8B]), Compression::Gzip);
        assert_eq!(CompressionMode::None.for_input(&[0x1F, 0x8B]), Compression::None);
        assert_eq!(CompressionMode::Auto.for_output(), Compression::Gzip);
    }

    #[test]
    fn option_state_conversion() {
        let config = NbtConfig {
            reader: ReaderConfig {
                size_limit: 0,
                depth_limit: 16,
            },
            snbt: SnbtConfig {
                indent: 4,
                accept_legacy: true,
                ..SnbtConfig::default()
            },
            compression: CompressionMode::Gzip,
        };

        let state = config.option_state();
        assert_eq!(state.value(&READ_SIZE_LIMIT), 0);
        assert_eq!(state.value(&READ_DEPTH_LIMIT), 16);
        assert_eq!(state.value(&SNBT_INDENT), 4);
        assert!(state.value(&SNBT_ACCEPT_LEGACY));
        assert!(!state.value(&SNBT_EMIT_LEGACY));
    }

    #[test]
    fn json_round_trip() {
        let config = NbtConfig::default();
        let json = config.to_json().expect("Failed to serialize config");
        assert!(json.contains("\"compression\": \"auto\""));
        assert_eq!(parse_config(&json).expect("Failed to parse config"), config);
    }
}
