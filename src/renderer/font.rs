//! Glyph bitmap tables
//!
//! Fonts are byte-per-pixel tables: 256 glyphs per cell size, each glyph
//! `cell width * cell height` bytes, row-major, non-zero meaning "set". A
//! code point maps directly to its table index.

use std::borrow::Cow;

use crate::core::CellHeight;

/// Glyphs per table
pub const GLYPH_COUNT: usize = 256;

/// Source of glyph bitmaps for the renderer
pub trait GlyphStore {
    /// Bitmap for `code` at the given cell size, if one is available
    fn glyph(&self, code: u8, cell: CellHeight) -> Option<&[u8]>;
}

/// One byte-per-pixel glyph table for a single cell size
#[derive(Debug, Clone)]
pub struct FontTable {
    cell: CellHeight,
    data: Cow<'static, [u8]>,
}

impl FontTable {
    /// Wrap table data. Returns `None` unless it holds at least one glyph
    /// and a whole number of glyphs.
    pub fn new(cell: CellHeight, data: impl Into<Cow<'static, [u8]>>) -> Option<Self> {
        let data = data.into();
        let area = cell.area();
        if data.is_empty() || data.len() % area != 0 {
            log::warn!(
                "Rejecting font table of {} bytes for {}-pixel cells",
                data.len(),
                cell.height()
            );
            return None;
        }
        Some(Self { cell, data })
    }

    /// Debug font: every printable code is an outlined box, everything
    /// else is blank
    pub fn outline(cell: CellHeight) -> Self {
        let (w, h) = (cell.width() as usize, cell.height() as usize);
        let mut data = vec![0u8; GLYPH_COUNT * w * h];

        for code in 0..GLYPH_COUNT {
            let printable = (0x21..0x7F).contains(&code) || code >= 0xA1;
            if !printable {
                continue;
            }
            let glyph = &mut data[code * w * h..(code + 1) * w * h];
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    let edge = y == 1 || y == h - 2 || x == 1 || x == w - 2;
                    if edge {
                        glyph[y * w + x] = 1;
                    }
                }
            }
        }

        Self {
            cell,
            data: Cow::Owned(data),
        }
    }

    pub fn cell(&self) -> CellHeight {
        self.cell
    }

    /// Number of glyphs in the table
    pub fn len(&self) -> usize {
        self.data.len() / self.cell.area()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bitmap for a code point
    pub fn get(&self, code: u8) -> Option<&[u8]> {
        let area = self.cell.area();
        let start = usize::from(code) * area;
        self.data.get(start..start + area)
    }
}

impl GlyphStore for FontTable {
    fn glyph(&self, code: u8, cell: CellHeight) -> Option<&[u8]> {
        if cell == self.cell {
            self.get(code)
        } else {
            None
        }
    }
}

/// One optional table per supported cell size
#[derive(Debug, Clone, Default)]
pub struct FontSet {
    tables: [Option<FontTable>; 4],
}

impl FontSet {
    /// An empty set; every lookup misses
    pub fn new() -> Self {
        Self::default()
    }

    /// Outline debug fonts for every cell size
    pub fn outline() -> Self {
        let mut set = Self::new();
        for cell in CellHeight::ALL {
            set.insert(FontTable::outline(cell));
        }
        set
    }

    /// Install a table, replacing any table for the same cell size
    pub fn insert(&mut self, table: FontTable) {
        let index = table.cell().index();
        self.tables[index] = Some(table);
    }

    /// Builder form of [`FontSet::insert`]
    pub fn with(mut self, table: FontTable) -> Self {
        self.insert(table);
        self
    }

    pub fn table(&self, cell: CellHeight) -> Option<&FontTable> {
        self.tables[cell.index()].as_ref()
    }
}

impl GlyphStore for FontSet {
    fn glyph(&self, code: u8, cell: CellHeight) -> Option<&[u8]> {
        self.table(cell).and_then(|table| table.get(code))
    }
}

impl<G: GlyphStore + ?Sized> GlyphStore for &G {
    fn glyph(&self, code: u8, cell: CellHeight) -> Option<&[u8]> {
        (**self).glyph(code, cell)
    }
}
