//! Configuration for the framebuffer console

use serde::{Deserialize, Serialize};

use crate::blit::WaitPolicy;
use crate::core::color::{BLACK, BRIGHT_RED, BRIGHT_WHITE};
use crate::core::{CellHeight, PaletteIndex};
use crate::error::Result;

/// Console configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Initial glyph cell height (8, 14, 16 or 20)
    pub cell_height: CellHeight,
    /// Maximum number of text lines (0 = as many as fit)
    pub line_limit: u32,
    /// Colour settings
    pub colors: ColorConfig,
    /// How long to wait for the accelerator
    pub wait: WaitPolicy,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            cell_height: CellHeight::H16,
            line_limit: 0,
            colors: ColorConfig::default(),
            wait: WaitPolicy::default(),
        }
    }
}

/// Power-on palette indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Default foreground
    pub foreground: PaletteIndex,
    /// Default background
    pub background: PaletteIndex,
    /// Cursor block
    pub cursor: PaletteIndex,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            foreground: BRIGHT_WHITE,
            background: BLACK,
            cursor: BRIGHT_RED,
        }
    }
}

impl ConsoleConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
