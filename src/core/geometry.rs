//! Framebuffer geometry
//!
//! Derives the active drawing rectangle from the physical framebuffer and
//! the selected glyph cell. The active rectangle is the physical buffer with
//! a border of whole pixel rows removed from the top and bottom; every
//! terminal coordinate is relative to its first row.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Physical framebuffer description handed over by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramebufferInfo {
    /// Visible width in pixels (one byte per pixel)
    pub width: u32,
    /// Full height in pixels
    pub height: u32,
    /// Bytes per row
    pub pitch: u32,
    /// Total size in bytes
    pub size: u32,
}

impl FramebufferInfo {
    /// Describe a framebuffer of `width`x`height` with the given pitch,
    /// sized to exactly `pitch * height` bytes. Sizes beyond `u32` saturate
    /// and are rejected by [`validate`](Self::validate).
    pub fn new(width: u32, height: u32, pitch: u32) -> Self {
        Self {
            width,
            height,
            pitch,
            size: pitch.saturating_mul(height),
        }
    }

    /// Bytes needed to back `pitch * height` pixel rows
    pub fn required_len(&self) -> usize {
        (self.pitch as usize)
            .saturating_mul(self.height as usize)
            .max(self.size as usize)
    }

    /// Check the description against the memory backing it
    pub fn validate(&self, memory_len: usize) -> Result<()> {
        if self.pitch < self.width {
            return Err(Error::PitchTooNarrow {
                pitch: self.pitch,
                width: self.width,
            });
        }
        let required = self.required_len();
        if memory_len < required || required > u32::MAX as usize {
            return Err(Error::FramebufferTooSmall {
                required,
                actual: memory_len,
            });
        }
        Ok(())
    }
}

/// Supported glyph cell heights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum CellHeight {
    /// 8x8 cells
    H8,
    /// 8x14 cells
    H14,
    /// 8x16 cells
    #[default]
    H16,
    /// 10x20 cells
    H20,
}

impl CellHeight {
    /// All heights in toggle order
    pub const ALL: [CellHeight; 4] = [
        CellHeight::H8,
        CellHeight::H14,
        CellHeight::H16,
        CellHeight::H20,
    ];

    /// Cell height in pixels
    pub fn height(self) -> u32 {
        match self {
            CellHeight::H8 => 8,
            CellHeight::H14 => 14,
            CellHeight::H16 => 16,
            CellHeight::H20 => 20,
        }
    }

    /// Cell width in pixels
    pub fn width(self) -> u32 {
        match self {
            CellHeight::H20 => 10,
            _ => 8,
        }
    }

    /// Pixels in one cell
    pub fn area(self) -> usize {
        (self.width() * self.height()) as usize
    }

    /// Next height in the 8 -> 14 -> 16 -> 20 -> 8 cycle
    pub fn next(self) -> Self {
        match self {
            CellHeight::H8 => CellHeight::H14,
            CellHeight::H14 => CellHeight::H16,
            CellHeight::H16 => CellHeight::H20,
            CellHeight::H20 => CellHeight::H8,
        }
    }

    /// Index into per-height tables
    pub fn index(self) -> usize {
        match self {
            CellHeight::H8 => 0,
            CellHeight::H14 => 1,
            CellHeight::H16 => 2,
            CellHeight::H20 => 3,
        }
    }
}

impl TryFrom<u32> for CellHeight {
    type Error = Error;

    fn try_from(h: u32) -> Result<Self> {
        match h {
            8 => Ok(CellHeight::H8),
            14 => Ok(CellHeight::H14),
            16 => Ok(CellHeight::H16),
            20 => Ok(CellHeight::H20),
            other => Err(Error::UnsupportedCellHeight(other)),
        }
    }
}

impl From<CellHeight> for u32 {
    fn from(cell: CellHeight) -> u32 {
        cell.height()
    }
}

/// Largest cell area of any supported font (10x20)
pub const MAX_CELL_AREA: usize = 10 * 20;

/// The active drawing rectangle inside the physical framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Surface {
    info: FramebufferInfo,
    cell: CellHeight,
    /// Configured maximum number of text lines (0 = as many as fit)
    line_limit: u32,
    /// Pixel rows removed from the top and from the bottom
    border: u32,
}

impl Surface {
    /// Build the surface for a framebuffer and cell height
    pub fn new(info: FramebufferInfo, cell: CellHeight, line_limit: u32) -> Self {
        let mut surface = Self {
            info,
            cell,
            line_limit,
            border: 0,
        };
        surface.set_cell_height(cell);
        surface
    }

    /// Select a new cell height, clamping the line limit to what fits
    pub fn set_cell_height(&mut self, cell: CellHeight) {
        self.cell = cell;
        self.line_limit = self.line_limit.min(self.info.height / cell.height());
        self.recompute();
    }

    /// Change the line limit (0 = as many as fit)
    pub fn set_line_limit(&mut self, line_limit: u32) {
        self.line_limit = line_limit.min(self.info.height / self.cell.height());
        self.recompute();
    }

    fn recompute(&mut self) {
        let h = self.cell.height();
        let fit = self.info.height / h;
        let lines = if self.line_limit > 0 {
            self.line_limit.min(fit)
        } else {
            fit
        };

        let mut border = (self.info.height - lines * h) / 2;
        if self.line_limit == 0 && border == 0 && lines > 0 {
            border = h / 2;
        }
        self.border = border;
    }

    /// Physical framebuffer description
    pub fn info(&self) -> &FramebufferInfo {
        &self.info
    }

    /// Active cell size
    pub fn cell(&self) -> CellHeight {
        self.cell
    }

    /// Effective line limit after clamping
    pub fn line_limit(&self) -> u32 {
        self.line_limit
    }

    /// Border height in pixel rows
    pub fn border(&self) -> u32 {
        self.border
    }

    /// Visible width in pixels
    pub fn width(&self) -> u32 {
        self.info.width
    }

    /// Bytes per pixel row
    pub fn pitch(&self) -> u32 {
        self.info.pitch
    }

    /// Active height in pixels
    pub fn height(&self) -> u32 {
        self.info.height.saturating_sub(2 * self.border)
    }

    /// Active size in bytes
    pub fn size(&self) -> usize {
        (self.info.size as usize).saturating_sub(2 * self.border as usize * self.info.pitch as usize)
    }

    /// Byte offset of the active rectangle from the framebuffer base
    pub fn base(&self) -> usize {
        self.border as usize * self.info.pitch as usize
    }

    /// Text rows that fit in the active rectangle
    pub fn rows(&self) -> u32 {
        self.height() / self.cell.height()
    }

    /// Text columns that fit in the visible width
    pub fn cols(&self) -> u32 {
        self.info.width / self.cell.width()
    }

    /// Bytes covered by one text row
    pub fn bytes_per_line(&self) -> usize {
        self.cell.height() as usize * self.info.pitch as usize
    }

    /// Byte offset of pixel `(x, y)` of the active rectangle
    pub fn offset(&self, x: u32, y: u32) -> usize {
        self.base() + y as usize * self.info.pitch as usize + x as usize
    }

    /// Byte offset of the top-left pixel of a text cell
    pub fn cell_offset(&self, row: u32, col: u32) -> usize {
        self.offset(col * self.cell.width(), row * self.cell.height())
    }

    /// Whether a text cell lies inside the active rectangle
    pub fn contains_cell(&self, row: u32, col: u32) -> bool {
        row < self.rows() && col < self.cols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fb(width: u32, height: u32) -> FramebufferInfo {
        FramebufferInfo::new(width, height, width)
    }

    #[test]
    fn test_cell_height_cycle() {
        let mut cell = CellHeight::H8;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(cell.height());
            cell = cell.next();
        }
        assert_eq!(seen, vec![8, 14, 16, 20]);
        assert_eq!(cell, CellHeight::H8);
    }

    #[test]
    fn test_cell_width() {
        assert_eq!(CellHeight::H8.width(), 8);
        assert_eq!(CellHeight::H16.width(), 8);
        assert_eq!(CellHeight::H20.width(), 10);
        assert_eq!(CellHeight::H20.area(), MAX_CELL_AREA);
    }

    #[test]
    fn test_cell_height_try_from() {
        assert_eq!(CellHeight::try_from(14).unwrap(), CellHeight::H14);
        assert!(matches!(
            CellHeight::try_from(12),
            Err(Error::UnsupportedCellHeight(12))
        ));
    }

    #[test]
    fn test_full_screen_forces_half_cell_border() {
        // 480 / 16 = 30 lines exactly, so the border would be zero
        let surface = Surface::new(fb(640, 480), CellHeight::H16, 0);
        assert_eq!(surface.border(), 8);
        assert_eq!(surface.height(), 464);
        assert_eq!(surface.rows(), 29);
        assert_eq!(surface.cols(), 80);
        assert_eq!(surface.base(), 8 * 640);
    }

    #[test]
    fn test_remainder_becomes_border() {
        // 480 / 14 = 34 lines, 4 spare pixel rows
        let surface = Surface::new(fb(640, 480), CellHeight::H14, 0);
        assert_eq!(surface.border(), 2);
        assert_eq!(surface.rows(), 34);
    }

    #[test]
    fn test_line_limit_centres_text() {
        let surface = Surface::new(fb(640, 480), CellHeight::H16, 24);
        assert_eq!(surface.border(), (480 - 24 * 16) / 2);
        assert_eq!(surface.rows(), 24);
    }

    #[test]
    fn test_line_limit_clamped_by_cell_height() {
        let mut surface = Surface::new(fb(640, 480), CellHeight::H8, 50);
        assert_eq!(surface.line_limit(), 50);
        surface.set_cell_height(CellHeight::H20);
        assert_eq!(surface.line_limit(), 24);
        assert_eq!(surface.rows(), 24);
        assert_eq!(surface.cols(), 64);
    }

    #[test]
    fn test_cell_offset() {
        let surface = Surface::new(FramebufferInfo::new(640, 480, 1024), CellHeight::H16, 0);
        assert_eq!(surface.cell_offset(0, 0), 8 * 1024);
        assert_eq!(surface.cell_offset(1, 2), 8 * 1024 + 16 * 1024 + 16);
    }

    #[test]
    fn test_validate() {
        let info = FramebufferInfo::new(640, 480, 640);
        assert!(info.validate(640 * 480).is_ok());
        assert!(matches!(
            info.validate(100),
            Err(Error::FramebufferTooSmall { .. })
        ));
        let narrow = FramebufferInfo::new(640, 480, 600);
        assert!(matches!(
            narrow.validate(1 << 20),
            Err(Error::PitchTooNarrow { .. })
        ));
    }

    #[test]
    fn test_oversized_framebuffer_rejected() {
        let info = FramebufferInfo::new(70_000, 70_000, 70_000);
        assert_eq!(info.size, u32::MAX);
        assert_eq!(info.required_len(), 70_000usize * 70_000);
        assert!(matches!(
            info.validate(usize::MAX),
            Err(Error::FramebufferTooSmall { .. })
        ));
    }

    proptest! {
        #[test]
        fn test_active_height_invariant(
            height in 1u32..2000,
            cell_index in 0usize..4,
            line_limit in 0u32..200,
        ) {
            let cell = CellHeight::ALL[cell_index];
            let surface = Surface::new(fb(320, height), cell, line_limit);
            let border = surface.border();

            prop_assert!(2 * border <= height);
            prop_assert_eq!(surface.height(), height - 2 * border);
            prop_assert_eq!(surface.rows(), surface.height() / cell.height());
            prop_assert!(surface.base() + surface.size() <= (320 * height) as usize);
        }
    }
}
