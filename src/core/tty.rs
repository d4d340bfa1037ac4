//! Terminal state
//!
//! The mutable "tty" model: dimensions, cursor, saved cursor, scrolling
//! region, mode flags, pen colours and per-line attributes. Nothing here
//! touches pixels; operations that require a scroll report it to the caller,
//! which drives the renderer.

use serde::{Deserialize, Serialize};

use super::color::Pen;
use super::cursor::Cursor;

/// Number of per-line attribute slots
pub const MAX_LINES: usize = 255;

/// Tab stops every 8 columns
const TAB_WIDTH: u32 = 8;

/// DEC line size attribute (`ESC # 3/4/5`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum LineAttribute {
    /// DECSWL - normal single-width line
    #[default]
    SingleWidth = 0,
    /// DECDHL - top half of a double-height line
    DoubleHeightTop = 1,
    /// DECDHL - bottom half of a double-height line
    DoubleHeightBottom = 2,
}

/// Terminal state driven by the escape-sequence scanner
#[derive(Debug, Clone)]
pub struct TtyState {
    rows: u32,
    cols: u32,
    /// Current cursor position
    pub cursor: Cursor,
    /// Position stored by `CSI s`
    pub saved_cursor: Cursor,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: u32,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: u32,
    /// Autowrap (DECAWM)
    pub wraparound: bool,
    /// Cursor visible (DECTCEM)
    pub cursor_visible: bool,
    /// Current colours
    pub pen: Pen,
    line_attributes: [LineAttribute; MAX_LINES],
}

impl TtyState {
    /// Create state for a `rows` x `cols` screen
    pub fn new(rows: u32, cols: u32, pen: Pen) -> Self {
        Self {
            rows,
            cols,
            cursor: Cursor::default(),
            saved_cursor: Cursor::default(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
            wraparound: true,
            cursor_visible: true,
            pen,
            line_attributes: [LineAttribute::default(); MAX_LINES],
        }
    }

    /// Number of text rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of text columns
    pub fn cols(&self) -> u32 {
        self.cols
    }

    /// Scroll region top
    pub fn scroll_top(&self) -> u32 {
        self.scroll_top
    }

    /// Scroll region bottom
    pub fn scroll_bottom(&self) -> u32 {
        self.scroll_bottom
    }

    /// Adopt new dimensions after a geometry change: home the cursor and
    /// reset the scroll region to the whole screen
    pub fn resize(&mut self, rows: u32, cols: u32) {
        self.rows = rows;
        self.cols = cols;
        self.cursor = Cursor::default();
        self.reset_scroll_region();
    }

    /// Whether the cursor row lies inside the scroll region
    pub fn in_scroll_region(&self) -> bool {
        (self.scroll_top..=self.scroll_bottom).contains(&self.cursor.row)
    }

    /// Move the cursor to a signed position, clamped to the screen
    pub fn move_cursor(&mut self, row: i64, col: i64) {
        self.cursor.move_to(row, col, self.rows, self.cols);
    }

    /// Move the cursor up by n rows
    pub fn move_cursor_up(&mut self, n: u32) {
        let row = i64::from(self.cursor.row) - i64::from(n);
        self.move_cursor(row, i64::from(self.cursor.col));
    }

    /// Move the cursor down by n rows
    pub fn move_cursor_down(&mut self, n: u32) {
        let row = i64::from(self.cursor.row) + i64::from(n);
        self.move_cursor(row, i64::from(self.cursor.col));
    }

    /// Move the cursor right by n columns
    pub fn move_cursor_forward(&mut self, n: u32) {
        let col = i64::from(self.cursor.col) + i64::from(n);
        self.move_cursor(i64::from(self.cursor.row), col);
    }

    /// Move the cursor left by n columns
    pub fn move_cursor_backward(&mut self, n: u32) {
        let col = i64::from(self.cursor.col) - i64::from(n);
        self.move_cursor(i64::from(self.cursor.row), col);
    }

    /// Save cursor position (`CSI s`)
    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor;
    }

    /// Restore cursor position (`CSI u`)
    pub fn restore_cursor(&mut self) {
        self.cursor = self.saved_cursor;
    }

    /// Set the scroll region from 1-based DECSTBM parameters.
    ///
    /// Returns false (leaving the region alone) unless both parameters are
    /// positive and the region spans at least two rows after the bottom is
    /// clamped to the last row.
    pub fn set_scroll_region(&mut self, top: u32, bottom: u32) -> bool {
        if top == 0 || bottom == 0 {
            return false;
        }
        let top = top - 1;
        let bottom = (bottom - 1).min(self.rows.saturating_sub(1));
        if bottom <= top {
            return false;
        }
        self.scroll_top = top;
        self.scroll_bottom = bottom;
        true
    }

    /// Reset the scroll region to the full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows.saturating_sub(1);
    }

    /// CR
    pub fn carriage_return(&mut self) {
        self.cursor.col = 0;
    }

    /// BS
    pub fn backspace(&mut self) {
        self.cursor.col = self.cursor.col.saturating_sub(1);
    }

    /// HT: next multiple of 8, clamped to the last column
    pub fn tab(&mut self) {
        let next = (self.cursor.col / TAB_WIDTH + 1) * TAB_WIDTH;
        self.cursor.col = next.min(self.cols.saturating_sub(1));
    }

    /// LF: advance the row and apply the autoscroll policy.
    ///
    /// Returns true when the scroll region must be scrolled up by one line.
    pub fn line_feed(&mut self) -> bool {
        self.cursor.row += 1;
        self.autoscroll()
    }

    /// Handle the column running past the last column after a byte.
    ///
    /// Returns true when the scroll region must be scrolled up by one line.
    pub fn wrap_column(&mut self) -> bool {
        if self.cols == 0 || self.cursor.col < self.cols {
            return false;
        }
        if self.wraparound {
            self.cursor.col = 0;
            self.cursor.row += 1;
            self.autoscroll()
        } else {
            self.cursor.col = self.cols - 1;
            false
        }
    }

    /// If the row just vacated is inside the region and the cursor reached
    /// the region bottom, pin the cursor one row above the bottom and request
    /// a scroll; otherwise clamp to the last row.
    fn autoscroll(&mut self) -> bool {
        let region = self.scroll_top..=self.scroll_bottom;
        let vacated_in_region = self
            .cursor
            .row
            .checked_sub(1)
            .is_some_and(|previous| region.contains(&previous));

        if vacated_in_region && self.cursor.row >= self.scroll_bottom {
            self.cursor.row = self.scroll_bottom.saturating_sub(1);
            true
        } else {
            self.cursor.row = self.cursor.row.min(self.rows.saturating_sub(1));
            false
        }
    }

    /// Record a line size attribute for the cursor row
    pub fn set_line_attribute(&mut self, attribute: LineAttribute) {
        if let Some(slot) = self.line_attributes.get_mut(self.cursor.row as usize) {
            *slot = attribute;
        }
    }

    /// Line size attribute of a row
    pub fn line_attribute(&self, row: u32) -> LineAttribute {
        self.line_attributes
            .get(row as usize)
            .copied()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tty(rows: u32, cols: u32) -> TtyState {
        TtyState::new(rows, cols, Pen::default())
    }

    #[test]
    fn test_tty_new() {
        let tty = tty(24, 80);
        assert_eq!(tty.rows(), 24);
        assert_eq!(tty.cols(), 80);
        assert_eq!(tty.scroll_top(), 0);
        assert_eq!(tty.scroll_bottom(), 23);
        assert!(tty.wraparound);
        assert!(tty.cursor_visible);
    }

    #[test]
    fn test_relative_moves_clamp() {
        let mut tty = tty(24, 80);
        tty.move_cursor_down(999);
        assert_eq!(tty.cursor.row, 23);
        tty.move_cursor_up(999);
        assert_eq!(tty.cursor.row, 0);
        tty.move_cursor_forward(999);
        assert_eq!(tty.cursor.col, 79);
        tty.move_cursor_backward(10);
        assert_eq!(tty.cursor.col, 69);
    }

    #[test]
    fn test_tab_stops() {
        let mut tty = tty(24, 20);
        tty.tab();
        assert_eq!(tty.cursor.col, 8);
        tty.cursor.col = 9;
        tty.tab();
        assert_eq!(tty.cursor.col, 16);
        tty.tab();
        assert_eq!(tty.cursor.col, 19);
    }

    #[test]
    fn test_backspace_stops_at_zero() {
        let mut tty = tty(24, 80);
        tty.cursor.col = 1;
        tty.backspace();
        tty.backspace();
        assert_eq!(tty.cursor.col, 0);
    }

    #[test]
    fn test_line_feed_scrolls_at_region_bottom() {
        let mut tty = tty(24, 80);
        tty.cursor.row = 21;
        assert!(!tty.line_feed());
        assert_eq!(tty.cursor.row, 22);

        // Reaching the last row scrolls and pins one row above it
        assert!(tty.line_feed());
        assert_eq!(tty.cursor.row, 22);
    }

    #[test]
    fn test_line_feed_outside_region_clamps() {
        let mut tty = tty(24, 80);
        assert!(tty.set_scroll_region(1, 5));
        tty.cursor.row = 10;
        for _ in 0..20 {
            assert!(!tty.line_feed());
        }
        assert_eq!(tty.cursor.row, 23);
    }

    #[test]
    fn test_wrap_column() {
        let mut tty = tty(24, 10);
        tty.cursor.col = 10;
        assert!(!tty.wrap_column());
        assert_eq!(tty.cursor, Cursor::new(1, 0));

        tty.wraparound = false;
        tty.cursor.col = 10;
        assert!(!tty.wrap_column());
        assert_eq!(tty.cursor, Cursor::new(1, 9));
    }

    #[test]
    fn test_scroll_region_validation() {
        let mut tty = tty(24, 80);
        assert!(!tty.set_scroll_region(0, 5));
        assert!(!tty.set_scroll_region(10, 5));
        assert!(!tty.set_scroll_region(5, 5));
        assert_eq!((tty.scroll_top(), tty.scroll_bottom()), (0, 23));

        assert!(tty.set_scroll_region(5, 6));
        assert_eq!((tty.scroll_top(), tty.scroll_bottom()), (4, 5));

        // Bottom beyond the screen is clamped
        assert!(tty.set_scroll_region(2, 99));
        assert_eq!((tty.scroll_top(), tty.scroll_bottom()), (1, 23));

        tty.reset_scroll_region();
        assert_eq!((tty.scroll_top(), tty.scroll_bottom()), (0, 23));
    }

    #[test]
    fn test_save_restore_cursor() {
        let mut tty = tty(24, 80);
        tty.move_cursor(5, 10);
        tty.save_cursor();
        tty.move_cursor(0, 0);
        tty.restore_cursor();
        assert_eq!(tty.cursor, Cursor::new(5, 10));
    }

    #[test]
    fn test_line_attributes() {
        let mut tty = tty(24, 80);
        tty.cursor.row = 3;
        tty.set_line_attribute(LineAttribute::DoubleHeightTop);
        assert_eq!(tty.line_attribute(3), LineAttribute::DoubleHeightTop);
        assert_eq!(tty.line_attribute(4), LineAttribute::SingleWidth);
        assert_eq!(tty.line_attribute(1000), LineAttribute::SingleWidth);
    }

    #[test]
    fn test_resize_homes_cursor() {
        let mut tty = tty(24, 80);
        tty.move_cursor(10, 10);
        tty.set_scroll_region(2, 8);
        tty.resize(30, 100);
        assert_eq!(tty.cursor, Cursor::default());
        assert_eq!(tty.scroll_bottom(), 29);
        assert_eq!(tty.cols(), 100);
    }
}
