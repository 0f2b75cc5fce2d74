use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::color::ColorComponents;

/// Drawing modifiers applied by every brush stamp.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingModes {
    /// Mirror across the vertical center line (`x' = W-1-x`).
    pub vertical_symmetry: bool,
    /// Mirror across the horizontal center line (`y' = H-1-y`).
    pub horizontal_symmetry: bool,
    /// Only paint pixels where `x % 2 != y % 2`.
    pub checkered_drawing: bool,
    /// Fill the interior of pencil strokes that end near where they began.
    pub fill_drawn_paths: bool,
}

/// Settings used to open a new document, loadable from JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    pub width: usize,
    pub height: usize,
    /// Initial tool color as `RRGGBBAA` (any form accepted by [`ColorComponents::from_hex`]).
    pub tool_color: String,
    /// Built-in palette key: `sp16`, `rrggbb`, `hhhhssbb` or `rrrgggbb`.
    pub palette: String,
    #[serde(flatten)]
    pub modes: DrawingModes,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            tool_color: "000000FF".to_string(),
            palette: "sp16".to_string(),
            modes: DrawingModes::default(),
        }
    }
}

impl DocumentSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&text)?;
        log::info!(
            "loaded settings from {}: {}x{} canvas",
            path.display(),
            settings.width,
            settings.height
        );
        Ok(settings)
    }

    /// Parsed tool color, falling back to opaque black when the hex is invalid.
    pub fn tool_color(&self) -> ColorComponents {
        ColorComponents::from_hex(&self.tool_color).unwrap_or_else(|| {
            log::warn!("invalid tool color `{}`, using black", self.tool_color);
            ColorComponents::BLACK
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = DocumentSettings::from_json_str(r#"{"width": 16, "checkered_drawing": true}"#)
            .unwrap();
        assert_eq!(settings.width, 16);
        assert_eq!(settings.height, 32);
        assert_eq!(settings.palette, "sp16");
        assert!(settings.modes.checkered_drawing);
        assert!(!settings.modes.vertical_symmetry);
    }

    #[test]
    fn tool_color_falls_back_to_black() {
        let mut settings = DocumentSettings::default();
        assert_eq!(settings.tool_color(), ColorComponents::BLACK);
        settings.tool_color = "#FF000080".to_string();
        assert_eq!(settings.tool_color(), ColorComponents::rgba(255, 0, 0, 128));
        settings.tool_color = "nope".to_string();
        assert_eq!(settings.tool_color(), ColorComponents::BLACK);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = DocumentSettings::from_json_str("{width:").unwrap_err();
        assert!(matches!(err, crate::error::PencilError::Config(_)));
    }
}
