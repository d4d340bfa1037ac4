//! Cursor state management
//!
//! Tracks the text cursor position and the overlay that keeps a copy of the
//! pixels under the cursor cell, so the blinking block can be drawn and
//! removed without damaging rendered text.

use serde::{Deserialize, Serialize};

use super::color::{PaletteIndex, BRIGHT_RED};
use super::geometry::MAX_CELL_AREA;

/// Cursor position (0-indexed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    pub row: u32,
    pub col: u32,
}

impl Cursor {
    /// Create a cursor at the given position
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Move to a signed position, clamping into `rows` x `cols`
    pub fn move_to(&mut self, row: i64, col: i64, rows: u32, cols: u32) {
        self.row = clamp_coord(row, rows);
        self.col = clamp_coord(col, cols);
    }
}

fn clamp_coord(value: i64, limit: u32) -> u32 {
    let max = i64::from(limit.saturating_sub(1));
    value.clamp(0, max) as u32
}

/// What the overlay wants drawn into the cursor cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorFrame {
    /// Paint the whole cell in the cursor colour
    Solid(PaletteIndex),
    /// Put the saved cell content back
    Restore,
}

/// Backing buffer and blink bookkeeping for the cursor cell
#[derive(Debug, Clone)]
pub struct CursorOverlay {
    /// Pixels under the cursor, row-major, `cell width * cell height` used
    backing: [u8; MAX_CELL_AREA],
    /// Current blink phase (true = cursor shown)
    blink_on: bool,
    /// Phase last drawn into the framebuffer, `None` when invalidated
    rendered: Option<bool>,
    /// Cursor block colour
    color: PaletteIndex,
}

impl Default for CursorOverlay {
    fn default() -> Self {
        Self::new(BRIGHT_RED)
    }
}

impl CursorOverlay {
    /// Create an overlay drawing the cursor in `color`
    pub fn new(color: PaletteIndex) -> Self {
        Self {
            backing: [0; MAX_CELL_AREA],
            blink_on: true,
            rendered: None,
            color,
        }
    }

    /// Current blink phase
    pub fn blink_on(&self) -> bool {
        self.blink_on
    }

    /// Cursor block colour
    pub fn color(&self) -> PaletteIndex {
        self.color
    }

    /// Flip the blink phase
    pub fn toggle_blink(&mut self) {
        self.blink_on = !self.blink_on;
    }

    /// Forget what was drawn so the next frame is always emitted
    pub fn invalidate(&mut self) {
        self.rendered = None;
    }

    /// Frame to draw for the current phase, or `None` if it is already on
    /// screen
    pub fn next_frame(&mut self, visible: bool) -> Option<CursorFrame> {
        if self.rendered == Some(self.blink_on) {
            return None;
        }
        self.rendered = Some(self.blink_on);

        if visible && self.blink_on {
            Some(CursorFrame::Solid(self.color))
        } else {
            Some(CursorFrame::Restore)
        }
    }

    /// Saved pixels
    pub fn backing(&self) -> &[u8] {
        &self.backing
    }

    /// Saved pixels, writable
    pub fn backing_mut(&mut self) -> &mut [u8] {
        &mut self.backing
    }
}
