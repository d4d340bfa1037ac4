//! Deterministic state snapshots
//!
//! Snapshots capture the terminal state (not the pixels) in a serializable
//! form for tests and the headless runner. Feeding the same byte stream
//! into two consoles of the same geometry must produce equal snapshots.

use serde::{Deserialize, Serialize};

use super::color::Pen;
use super::cursor::Cursor;
use super::geometry::Surface;
use super::tty::{LineAttribute, TtyState};

/// Terminal state at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub rows: u32,
    pub cols: u32,
    /// Glyph cell size
    pub cell_width: u32,
    pub cell_height: u32,
    /// Border height in pixel rows
    pub border: u32,
    pub cursor: Cursor,
    pub saved_cursor: Cursor,
    /// Scroll region, inclusive
    pub scroll_top: u32,
    pub scroll_bottom: u32,
    pub modes: ModesSnapshot,
    pub pen: Pen,
    /// Rows carrying a non-default line attribute
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_attributes: Vec<(u32, LineAttribute)>,
}

/// Mode flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModesSnapshot {
    pub wraparound: bool,
    pub cursor_visible: bool,
}

impl Snapshot {
    /// Capture the terminal state laid out on `surface`
    pub fn capture(tty: &TtyState, surface: &Surface) -> Self {
        let line_attributes = (0..tty.rows())
            .map(|row| (row, tty.line_attribute(row)))
            .filter(|(_, attr)| *attr != LineAttribute::SingleWidth)
            .collect();

        Self {
            rows: tty.rows(),
            cols: tty.cols(),
            cell_width: surface.cell().width(),
            cell_height: surface.cell().height(),
            border: surface.border(),
            cursor: tty.cursor,
            saved_cursor: tty.saved_cursor,
            scroll_top: tty.scroll_top(),
            scroll_bottom: tty.scroll_bottom(),
            modes: ModesSnapshot {
                wraparound: tty.wraparound,
                cursor_visible: tty.cursor_visible,
            },
            pen: tty.pen,
            line_attributes,
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Short human-readable summary (for debugging)
    pub fn to_text(&self) -> String {
        let mut text = format!(
            "size: {}x{} cells of {}x{} (border {})\n",
            self.cols, self.rows, self.cell_width, self.cell_height, self.border
        );
        text.push_str(&format!(
            "cursor: {},{} (saved {},{})\n",
            self.cursor.row, self.cursor.col, self.saved_cursor.row, self.saved_cursor.col
        ));
        text.push_str(&format!(
            "region: {}..={}\n",
            self.scroll_top, self.scroll_bottom
        ));
        text.push_str(&format!(
            "pen: fg {} bg {}{}\n",
            self.pen.fg,
            self.pen.bg,
            if self.pen.inverse { " inverse" } else { "" }
        ));
        text.push_str(&format!(
            "modes: wraparound={} cursor_visible={}\n",
            self.modes.wraparound, self.modes.cursor_visible
        ));
        text
    }
}
