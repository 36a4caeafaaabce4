//! Configuration file support for GKAT.
//!
//! Preferences are stored as versioned JSON in the user's config directory.

use serde::{Deserialize, Serialize};

use crate::correction::EditHistory;
use crate::coordinate::DisplayScale;
use crate::model::FeetLineMethod;
use crate::preview::{DEFAULT_CANVAS_SIZE, PreviewScaling};

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

/// Current configuration file format version.
/// Increment this when making breaking changes to the config format.
pub const CONFIG_VERSION: u32 = 1;

/// Confidence below which a detected landmark is flagged for review.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Application configuration that can be exported and imported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Version of the configuration file format
    pub version: u32,

    /// User preferences
    #[serde(default)]
    pub preferences: UserPreferences,

    /// Preview canvas and scaling
    #[serde(default)]
    pub preview: PreviewConfig,
}

/// User preferences section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPreferences {
    /// Log verbosity level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Landmarks below this confidence are reported as uncertain
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Feet line method preselected for new images
    #[serde(default)]
    pub feet_line_method: FeetLineMethod,

    /// Number of landmark corrections that can be undone
    #[serde(default = "default_undo_history")]
    pub undo_history: usize,
}

fn default_confidence_threshold() -> f64 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_undo_history() -> usize {
    EditHistory::DEFAULT_MAX_HISTORY
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            confidence_threshold: default_confidence_threshold(),
            feet_line_method: FeetLineMethod::default(),
            undo_history: default_undo_history(),
        }
    }
}

/// Preview section of the config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Preview downscale factor used when not fitting to the canvas
    #[serde(default = "default_downscale")]
    pub downscale: f64,

    /// Preview canvas width in pixels
    #[serde(default = "default_canvas_width")]
    pub canvas_width: u32,

    /// Preview canvas height in pixels
    #[serde(default = "default_canvas_height")]
    pub canvas_height: u32,

    /// Choose the downscale from the image size instead of using `downscale`
    #[serde(default)]
    pub fit_to_canvas: bool,
}

fn default_downscale() -> f64 {
    DisplayScale::DEFAULT_DOWNSCALE
}

fn default_canvas_width() -> u32 {
    DEFAULT_CANVAS_SIZE.0
}

fn default_canvas_height() -> u32 {
    DEFAULT_CANVAS_SIZE.1
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            downscale: default_downscale(),
            canvas_width: default_canvas_width(),
            canvas_height: default_canvas_height(),
            fit_to_canvas: false,
        }
    }
}

impl PreviewConfig {
    /// The scaling policy these settings describe.
    pub fn scaling(&self) -> PreviewScaling {
        if self.fit_to_canvas {
            PreviewScaling::FitCanvas {
                width: self.canvas_width,
                height: self.canvas_height,
            }
        } else {
            PreviewScaling::Fixed(self.downscale)
        }
    }
}

impl AppConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self {
            version: CONFIG_VERSION,
            preferences: UserPreferences::default(),
            preview: PreviewConfig::default(),
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

        if config.preview.downscale <= 0.0 || !config.preview.downscale.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "preview.downscale",
                message: format!("must be a positive number, got {}", config.preview.downscale),
            });
        }

        Ok(config)
    }

    /// Get the default filename for config export.
    pub fn default_filename() -> &'static str {
        "gkat-config.json"
    }

    /// Get the default config file path for auto-load/save.
    pub fn default_path() -> Option<std::path::PathBuf> {
        // Try to use XDG config directory, fall back to home directory
        if let Some(config_dir) = dirs::config_dir() {
            Some(config_dir.join("gkat").join(Self::default_filename()))
        } else {
            dirs::home_dir().map(|home_dir| {
                home_dir
                    .join(".config")
                    .join("gkat")
                    .join(Self::default_filename())
            })
        }
    }

    /// Load configuration from a file.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load configuration from a file that may not exist yet.
    /// Returns `Ok(None)` when there is no file.
    pub fn load_optional(path: &std::path::Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            log::debug!("No config file found at {:?}", path);
            return Ok(None);
        }
        Self::load_from_path(path).map(Some)
    }

    /// Load configuration from the default path.
    ///
    /// A missing file or config directory is not an error. A file that cannot be
    /// read or parsed is, so the caller can report it once logging is running.
    pub fn load_from_default_path() -> Result<Option<Self>, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_optional(&path),
            None => Ok(None),
        }
    }

    /// Save configuration to a file, creating parent directories if needed.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = self.to_json()?;
        std::fs::write(path, json)?;
        log::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new()
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

    /// A setting holds a value the workflow cannot use
    #[error("Invalid value for {field}: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },

    /// I/O error when reading/writing config
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
