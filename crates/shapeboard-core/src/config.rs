//! Editor configuration.
//!
//! Every field has a default so a config file only needs to list what it
//! overrides.

use crate::command::MAXIMUM_HISTORY_SIZE;
use crate::registry::CanvasOption;
use crate::shapes::{BarcodeFormat, ShapeStyle, Text};
use crate::snap::DEFAULT_SNAP_TOLERANCE;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Snapping behaviour while dragging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub enabled: bool,
    /// Maximum edge distance (canvas units) that still snaps.
    pub tolerance: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tolerance: DEFAULT_SNAP_TOLERANCE,
        }
    }
}

/// Undo history limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistoryConfig {
    pub max_size: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_size: MAXIMUM_HISTORY_SIZE,
        }
    }
}

/// Attributes given to freshly created shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShapeDefaults {
    pub style: ShapeStyle,
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub barcode_format: BarcodeFormat,
    pub barcode_code: String,
}

impl Default for ShapeDefaults {
    fn default() -> Self {
        Self {
            style: ShapeStyle::default(),
            text: "Text".to_string(),
            font_size: Text::DEFAULT_FONT_SIZE,
            font_family: Text::DEFAULT_FONT_FAMILY.to_string(),
            barcode_format: BarcodeFormat::default(),
            barcode_code: "123456789".to_string(),
        }
    }
}

/// Top-level editor configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    pub snap: SnapConfig,
    pub history: HistoryConfig,
    /// Canvas size and background for new documents.
    pub canvas: CanvasOption,
    pub shape_defaults: ShapeDefaults,
}

impl EditorConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.snap.tolerance.is_finite() || self.snap.tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "snap tolerance must be a non-negative number, got {}",
                self.snap.tolerance
            )));
        }
        if self.history.max_size == 0 {
            return Err(ConfigError::Invalid(
                "history maxSize must be at least 1".to_string(),
            ));
        }
        let size = self.canvas.canvas_size;
        if !(size.width > 0.0 && size.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be positive, got {}x{}",
                size.width, size.height
            )));
        }
        Ok(())
    }
}
