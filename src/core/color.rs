//! Palette colours and the drawing pen
//!
//! Pixels are 8-bit palette indices. The pen keeps the raw foreground and
//! background indices plus an inverse flag; renderers always go through
//! [`Pen::effective_fg`] and [`Pen::effective_bg`] so that toggling inverse
//! never rewrites the stored colours.

use serde::{Deserialize, Serialize};

/// An 8-bit palette index
pub type PaletteIndex = u8;

/// Standard ANSI colour indices
pub const BLACK: PaletteIndex = 0;
pub const WHITE: PaletteIndex = 7;
pub const BRIGHT_RED: PaletteIndex = 9;
pub const BRIGHT_WHITE: PaletteIndex = 15;

/// Bit that selects the bright half of the 16-colour palette
pub const BRIGHT_BIT: PaletteIndex = 8;

/// Foreground/background colours plus the inverse flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub fg: PaletteIndex,
    pub bg: PaletteIndex,
    pub inverse: bool,
}

impl Default for Pen {
    /// Power-on colours: bright white on black
    fn default() -> Self {
        Self {
            fg: BRIGHT_WHITE,
            bg: BLACK,
            inverse: false,
        }
    }
}

impl Pen {
    /// Create a pen with explicit colours
    pub fn new(fg: PaletteIndex, bg: PaletteIndex) -> Self {
        Self {
            fg,
            bg,
            inverse: false,
        }
    }

    /// Reset to white on black with inverse off (SGR 0)
    pub fn reset(&mut self) {
        self.bg = BLACK;
        self.fg = WHITE;
        self.inverse = false;
    }

    /// Toggle the inverse flag
    pub fn swap(&mut self) {
        self.inverse = !self.inverse;
    }

    /// Colour used for set glyph pixels, fills and lines
    pub fn effective_fg(&self) -> PaletteIndex {
        if self.inverse {
            self.bg
        } else {
            self.fg
        }
    }

    /// Colour used for unset glyph pixels, clears and scroll fills
    pub fn effective_bg(&self) -> PaletteIndex {
        if self.inverse {
            self.fg
        } else {
            self.bg
        }
    }
}

/// Replicate a palette index into all four bytes of a transfer word
pub fn fill_word(color: PaletteIndex) -> u32 {
    u32::from_ne_bytes([color; 4])
}
