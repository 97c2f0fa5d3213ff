//! Run configuration for the headless demo.
//!
//! A run configuration is a JSON file describing the frame size, how many
//! ticks and renders to drive, where to write the result and the transform
//! settings to apply, including the version they were saved with.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH};
use crate::settings::Version;

/// Log level setting for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Show only errors
    Error,
    /// Show errors and warnings
    Warn,
    /// Show errors, warnings, and info messages
    #[default]
    Info,
    /// Show debug-level logging
    Debug,
    /// Show all log messages including trace
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Current run configuration format version.
/// Increment this when making breaking changes to the format.
pub const CONFIG_VERSION: u32 = 1;

/// Size of the generated upstream frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_FRAME_WIDTH,
            height: DEFAULT_FRAME_HEIGHT,
        }
    }
}

/// Configuration for one headless run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Version of the configuration file format
    pub version: u32,

    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub frame: FrameSize,

    /// Number of ticks to drive
    #[serde(default = "default_ticks")]
    pub ticks: u32,

    /// Render calls per tick, one per downstream consumer
    #[serde(default = "default_renders_per_tick")]
    pub renders_per_tick: u32,

    /// Where the final frame is written as PNG
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Version the embedded settings were saved with
    #[serde(default)]
    pub settings_version: Version,

    /// Transform settings, keyed like the settings store
    #[serde(default)]
    pub settings: Map<String, Value>,

    /// Force the software fallback adapter
    #[serde(default)]
    pub software_adapter: bool,

    /// WGSL composite effect; the passthrough effect is used when unset
    #[serde(default)]
    pub effect: Option<PathBuf>,
}

fn default_ticks() -> u32 {
    1
}

fn default_renders_per_tick() -> u32 {
    1
}

fn default_output() -> PathBuf {
    PathBuf::from("frame-transform.png")
}

impl RunConfig {
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            log_level: LogLevel::default(),
            frame: FrameSize::default(),
            ticks: default_ticks(),
            renders_per_tick: default_renders_per_tick(),
            output: default_output(),
            settings_version: Version::CURRENT,
            settings: Map::new(),
            software_adapter: false,
            effect: None,
        }
    }

    /// Serialize configuration to JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }
        if config.frame.width == 0 || config.frame.height == 0 {
            return Err(ConfigError::InvalidFrame {
                width: config.frame.width,
                height: config.frame.height,
            });
        }

        Ok(config)
    }

    /// Load configuration from an explicit path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Get the default filename for the run configuration.
    pub fn default_filename() -> &'static str {
        "frame-transform.json"
    }

    /// Get the default config file path.
    pub fn default_path() -> Option<PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("frame-transform").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("frame-transform")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match Self::load(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("Failed to load config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration or settings.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing error
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Configuration version is newer than supported
    #[error(
        "Configuration file version {file_version} is newer than supported version {supported_version}"
    )]
    VersionTooNew {
        file_version: u32,
        supported_version: u32,
    },

    /// Frame size with a zero edge
    #[error("Invalid frame size {width}x{height}")]
    InvalidFrame { width: u32, height: u32 },

    /// Settings payload is not a key/value object
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_roundtrip() {
        let mut config = RunConfig::new();
        config.ticks = 3;
        config.renders_per_tick = 2;
        config.log_level = LogLevel::Debug;
        config
            .settings
            .insert("Rotation.Z".to_string(), Value::from(45.0));

        let json = config.to_json().expect("Failed to serialize");
        let loaded = RunConfig::from_json(&json).expect("Failed to deserialize");

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = RunConfig::from_json(r#"{ "version": 1 }"#).expect("parse");
        assert_eq!(config.frame, FrameSize::default());
        assert_eq!(config.ticks, 1);
        assert_eq!(config.renders_per_tick, 1);
        assert_eq!(config.settings_version, Version::CURRENT);
        assert!(config.settings.is_empty());
        assert!(!config.software_adapter);
        assert_eq!(config.effect, None);
    }

    #[test]
    fn test_effect_path_parses() {
        let json = r#"{ "version": 1, "effect": "shaders/vignette.wgsl" }"#;
        let config = RunConfig::from_json(json).expect("parse");
        assert_eq!(config.effect, Some(PathBuf::from("shaders/vignette.wgsl")));
    }

    #[test]
    fn test_version_too_new() {
        let json = format!(r#"{{ "version": {} }}"#, CONFIG_VERSION + 1);
        let result = RunConfig::from_json(&json);
        assert!(matches!(result, Err(ConfigError::VersionTooNew { .. })));
    }

    #[test]
    fn test_zero_frame_rejected() {
        let json = r#"{ "version": 1, "frame": { "width": 0, "height": 720 } }"#;
        let result = RunConfig::from_json(json);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidFrame {
                width: 0,
                height: 720
            })
        ));
    }

    #[test]
    fn test_legacy_settings_version_parses() {
        let json = r#"{
            "version": 1,
            "settings_version": { "major": 0, "minor": 10, "patch": 1 },
            "settings": { "Filter.Transform.Camera": 1 }
        }"#;
        let config = RunConfig::from_json(json).expect("parse");
        assert_eq!(config.settings_version, Version::new(0, 10, 1, 0));
        assert_eq!(config.settings.len(), 1);
    }

    #[test]
    fn test_log_level_filters() {
        assert_eq!(LogLevel::default().to_level_filter(), log::LevelFilter::Info);
        assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
    }
}
