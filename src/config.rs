//! Configuration file support for the vision pack.
//!
//! Layout constants, import behaviour and log verbosity can be overridden
//! from a JSON file. Every field falls back to its default when missing.

use serde::{Deserialize, Serialize};

/// Log level setting.
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
    /// Filter string understood by `env_logger`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

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

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Pack configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Image panel layout
    #[serde(default)]
    pub display: DisplayConfig,

    /// File drop behaviour
    #[serde(default)]
    pub import: ImportConfig,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

/// Layout of the image panel inside a node, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_margin")]
    pub margin: f32,

    /// Gap between the widget's start Y and the image
    #[serde(default = "default_image_top_padding")]
    pub image_top_padding: f32,

    #[serde(default = "default_meta_line_height")]
    pub meta_line_height: f32,

    /// Extra height below the meta lines
    #[serde(default = "default_meta_padding")]
    pub meta_padding: f32,

    /// Placeholder shown by the read-only display
    #[serde(default = "default_placeholder_text")]
    pub placeholder_text: String,

    /// Placeholder shown by the drop-target control
    #[serde(default = "default_drop_placeholder_text")]
    pub drop_placeholder_text: String,

    /// Widget size while no image is shown
    #[serde(default = "default_size")]
    pub default_size: [f32; 2],
}

fn default_margin() -> f32 {
    5.0
}

fn default_image_top_padding() -> f32 {
    1.0
}

fn default_meta_line_height() -> f32 {
    16.0
}

fn default_meta_padding() -> f32 {
    8.0
}

fn default_placeholder_text() -> String {
    "No image".to_string()
}

fn default_drop_placeholder_text() -> String {
    "Drag image here".to_string()
}

fn default_size() -> [f32; 2] {
    [100.0, 100.0]
}

impl DisplayConfig {
    /// Height of the meta box for `lines` text lines.
    pub fn meta_height(&self, lines: usize) -> f32 {
        lines as f32 * self.meta_line_height + self.meta_padding
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            image_top_padding: default_image_top_padding(),
            meta_line_height: default_meta_line_height(),
            meta_padding: default_meta_padding(),
            placeholder_text: default_placeholder_text(),
            drop_placeholder_text: default_drop_placeholder_text(),
            default_size: default_size(),
        }
    }
}

/// File drop settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Height a control widget takes after an image is dropped on it
    #[serde(default = "default_dropped_image_height")]
    pub dropped_image_height: f32,
}

fn default_dropped_image_height() -> f32 {
    200.0
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            dropped_image_height: default_dropped_image_height(),
        }
    }
}

impl PackConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            display: DisplayConfig::default(),
            import: ImportConfig::default(),
            log_level: LogLevel::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Get the default filename for the config file.
    pub fn default_filename() -> &'static str {
        "vision-pack.json"
    }

    /// Get the default config file path.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<std::path::PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("vision-pack").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("vision-pack")
                    .join(Self::default_filename())
            })
        }
    }

    /// Try to load configuration from the default path.
    /// Returns None if the file doesn't exist or can't be read.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_default_path() -> Option<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return None;
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded configuration from {:?}", path);
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {:?}: {}", path, e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read config file {:?}: {}", path, e);
                None
            }
        }
    }
}

impl Default for PackConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// JSON parsing failed
    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// Config version is newer than supported
    #[error("Config version {file_version} is newer than supported version {supported_version}")]
    VersionMismatch {
        /// Version found in the file
        file_version: u32,
        /// Highest version this build understands
        supported_version: u32,
    },
}
