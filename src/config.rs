//! Configuration file support for SALT.
//!
//! An [`EditorConfig`] names the dataset to open and carries the initial
//! display settings. It is stored as pretty-printed JSON; every field has a
//! default so partial files load.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::render::{DEFAULT_POINT_RADIUS, DisplayStyle};

/// Log level setting for the application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
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

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Number of images between automatic saves while moving forward.
pub const DEFAULT_AUTOSAVE_INTERVAL: usize = 10;

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Version of the configuration file format
    #[serde(default = "default_version")]
    pub version: u32,

    /// Dataset root holding `images/` and `embeddings/`
    #[serde(default)]
    pub dataset_path: PathBuf,

    /// Annotation file, `annotations.json` in the dataset root when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations_path: Option<PathBuf>,

    /// Category names for a dataset without an annotation file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Radius of click markers in pixels
    #[serde(default = "default_point_radius")]
    pub point_radius: u32,

    /// Save every this many images when moving forward, 0 disables
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval: usize,

    /// Initial display settings
    #[serde(default)]
    pub style: StyleConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_point_radius() -> u32 {
    DEFAULT_POINT_RADIUS
}

fn default_autosave_interval() -> usize {
    DEFAULT_AUTOSAVE_INTERVAL
}

/// Display settings section of the config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Weight of the image under a mask, 0.0 to 1.0
    pub transparency: f32,
    /// Bounding box line width in pixels
    pub box_width: u32,
    /// Label text scale, 0.5 to 5.0
    pub text_scale: f32,
    /// Draw outlines instead of filled masks
    pub contour_mode: bool,
    /// Draw label text above boxes
    pub show_labels: bool,
    /// Outline width in pixels
    pub contour_thickness: u32,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::from(&DisplayStyle::default())
    }
}

impl From<&DisplayStyle> for StyleConfig {
    fn from(style: &DisplayStyle) -> Self {
        Self {
            transparency: style.transparency(),
            box_width: style.box_width(),
            text_scale: style.text_scale(),
            contour_mode: style.contour_mode(),
            show_labels: style.show_labels(),
            contour_thickness: style.contour_thickness(),
        }
    }
}

impl StyleConfig {
    /// Build the display style, clamping out-of-range values.
    pub fn to_style(&self) -> DisplayStyle {
        DisplayStyle::new(
            self.transparency,
            self.box_width,
            self.text_scale,
            self.contour_mode,
            self.show_labels,
            self.contour_thickness,
        )
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self::new(PathBuf::new())
    }
}

impl EditorConfig {
    /// Create a configuration for a dataset with default values.
    pub fn new(dataset_path: impl Into<PathBuf>) -> Self {
        Self {
            version: CONFIG_VERSION,
            dataset_path: dataset_path.into(),
            annotations_path: None,
            categories: None,
            log_level: LogLevel::default(),
            point_radius: DEFAULT_POINT_RADIUS,
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            style: StyleConfig::default(),
        }
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;

        // Validate version compatibility
        if config.version > CONFIG_VERSION {
            return Err(ConfigError::VersionTooNew {
                file_version: config.version,
                supported_version: CONFIG_VERSION,
            });
        }

        Ok(config)
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Write the configuration, creating parent directories if needed.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

/// Errors that can occur when loading configuration.
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

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
