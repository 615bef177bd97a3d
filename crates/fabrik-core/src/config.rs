//! Canvas-wide settings loaded from JSON.

use crate::shapes::{Controls, SerializableColor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings shared by everything on a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CanvasConfig {
    /// Marquee fill.
    pub selection_color: SerializableColor,
    /// Marquee outline.
    pub selection_border_color: SerializableColor,
    pub selection_line_width: f64,
    /// Controls given to groups formed by multi-selection.
    pub group_controls: Controls,
    /// Update the cursor while hovering without a gesture.
    pub hover_enabled: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            selection_color: SerializableColor::new(100, 100, 255, 77),
            selection_border_color: SerializableColor::new(255, 255, 255, 77),
            selection_line_width: 1.0,
            group_controls: Controls::default(),
            hover_enabled: true,
        }
    }
}

impl CanvasConfig {
    /// Parse and validate a JSON document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded canvas config from {}", path.display());
        Ok(config)
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.selection_line_width.is_finite() || self.selection_line_width < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "selection_line_width must be a non-negative number, got {}",
                self.selection_line_width
            )));
        }
        let c = &self.group_controls;
        for (name, value) in [
            ("padding", c.padding),
            ("corner_size", c.corner_size),
            ("border_width", c.border_width),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "group_controls.{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&c.border_opacity_when_moving) {
            return Err(ConfigError::Invalid(format!(
                "group_controls.border_opacity_when_moving must be within [0, 1], got {}",
                c.border_opacity_when_moving
            )));
        }
        Ok(())
    }
}
