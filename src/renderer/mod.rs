//! Framebuffer rendering
//!
//! [`Renderer`] owns the framebuffer memory, the accelerator and the active
//! [`Surface`]. Bulk operations (fills, clears, scrolls) are queued as
//! transfer descriptors and awaited before returning; per-pixel work
//! (glyphs, lines, the cursor cell) is done on the CPU.
//!
//! All coordinates are relative to the active rectangle. Anything outside
//! it is clipped silently.

mod font;
mod line;

pub use font::{FontSet, FontTable, GlyphStore, GLYPH_COUNT};
pub use line::trace_line;

use crate::blit::{wait_idle, Accelerator, Transfer, WaitPolicy};
use crate::core::{CellHeight, PaletteIndex, Pen, Surface};
use crate::error::Result;

/// Blit primitives over a linear 8-bit framebuffer
#[derive(Debug)]
pub struct Renderer<M, A> {
    memory: M,
    accel: A,
    surface: Surface,
    wait: WaitPolicy,
}

impl<M, A> Renderer<M, A>
where
    M: AsRef<[u8]> + AsMut<[u8]>,
    A: Accelerator,
{
    /// Create a renderer, checking that `memory` covers the framebuffer
    pub fn new(memory: M, accel: A, surface: Surface, wait: WaitPolicy) -> Result<Self> {
        surface.info().validate(memory.as_ref().len())?;
        Ok(Self {
            memory,
            accel,
            surface,
            wait,
        })
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Select a cell height and recompute the active rectangle
    pub fn set_cell_height(&mut self, cell: CellHeight) {
        self.surface.set_cell_height(cell);
    }

    /// Change the line limit and recompute the active rectangle
    pub fn set_line_limit(&mut self, line_limit: u32) {
        self.surface.set_line_limit(line_limit);
    }

    /// The whole physical framebuffer
    pub fn framebuffer(&self) -> &[u8] {
        self.memory.as_ref()
    }

    pub fn accelerator(&self) -> &A {
        &self.accel
    }

    pub fn accelerator_mut(&mut self) -> &mut A {
        &mut self.accel
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    /// Give back the framebuffer memory and the accelerator
    pub fn into_parts(self) -> (M, A) {
        (self.memory, self.accel)
    }

    /// Pixel of the active rectangle, if inside it
    pub fn pixel(&self, x: u32, y: u32) -> Option<PaletteIndex> {
        if x >= self.surface.width() || y >= self.surface.height() {
            return None;
        }
        self.memory.as_ref().get(self.surface.offset(x, y)).copied()
    }

    /// Run the queue and wait for the accelerator to go idle
    fn submit(&mut self) -> Result<()> {
        self.accel.execute_queue(self.memory.as_mut());
        wait_idle(&self.accel, self.wait)
    }

    /// Fill a rectangle with `color`, clipped to the active rectangle
    pub fn fill_rect(
        &mut self,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        color: PaletteIndex,
    ) -> Result<()> {
        let (surface_w, surface_h) = (self.surface.width(), self.surface.height());
        if x >= surface_w || y >= surface_h || width == 0 || height == 0 {
            return Ok(());
        }
        let width = width.min(surface_w - x);
        let height = height.min(surface_h - y);

        let stride = self.surface.pitch() - width;
        self.accel.enqueue(Transfer::fill_block(
            self.surface.offset(x, y),
            width as usize,
            height as usize,
            stride as usize,
            color,
        ));
        self.submit()
    }

    /// Fill the active rectangle
    pub fn clear(&mut self, color: PaletteIndex) -> Result<()> {
        self.accel
            .enqueue(Transfer::fill(self.surface.base(), self.surface.size(), color));
        self.submit()
    }

    /// Fill the whole physical framebuffer, borders included
    pub fn clear_full(&mut self, color: PaletteIndex) -> Result<()> {
        self.accel
            .enqueue(Transfer::fill(0, self.surface.info().size as usize, color));
        self.submit()
    }

    /// Fill text rows `from..=to` (clamped to the last row) across the full
    /// width
    pub fn clear_rows(&mut self, from: u32, to: u32, color: PaletteIndex) -> Result<()> {
        let to = to.min(self.surface.rows().saturating_sub(1));
        if from > to || self.surface.rows() == 0 {
            return Ok(());
        }
        let h = self.surface.cell().height();
        self.fill_rect(0, from * h, self.surface.width(), (to - from + 1) * h, color)
    }

    /// Scroll text rows `start..=end` up by `n`, filling the exposed rows
    /// at the bottom with `color`
    pub fn scroll_up(&mut self, start: u32, end: u32, n: u32, color: PaletteIndex) -> Result<()> {
        let end = end.min(self.surface.rows().saturating_sub(1));
        if start > end || n == 0 || self.surface.rows() == 0 {
            return Ok(());
        }
        let n = n.min(end - start + 1);
        let line = self.surface.bytes_per_line();
        let base = self.surface.base();

        let remaining = (end - start + 1 - n) as usize;
        if remaining > 0 {
            self.accel.enqueue(Transfer::copy(
                base + (start + n) as usize * line,
                base + start as usize * line,
                remaining * line,
            ));
        }
        self.accel.enqueue(Transfer::fill(
            base + (end - n + 1) as usize * line,
            n as usize * line,
            color,
        ));
        self.submit()
    }

    /// Scroll text rows `start..=end` down by `n` (at most `end - start`),
    /// filling the exposed rows at the top with `color`
    pub fn scroll_down(&mut self, start: u32, end: u32, n: u32, color: PaletteIndex) -> Result<()> {
        let end = end.min(self.surface.rows().saturating_sub(1));
        if start > end || self.surface.rows() == 0 {
            return Ok(());
        }
        let n = n.min(end - start);
        if n == 0 {
            return Ok(());
        }
        let line = self.surface.bytes_per_line();
        let base = self.surface.base();

        // Bottom row first so sources are read before they are overwritten
        for row in (start..=end - n).rev() {
            self.accel.enqueue(Transfer::copy(
                base + row as usize * line,
                base + (row + n) as usize * line,
                line,
            ));
        }
        self.accel.enqueue(Transfer::fill(
            base + start as usize * line,
            n as usize * line,
            color,
        ));
        self.submit()
    }

    /// Draw a glyph into a text cell; a missing bitmap draws a blank cell.
    /// Cells outside the screen are ignored.
    pub fn put_glyph(&mut self, row: u32, col: u32, bitmap: Option<&[u8]>, pen: &Pen) {
        if !self.surface.contains_cell(row, col) {
            return;
        }
        let cell = self.surface.cell();
        let (w, h) = (cell.width() as usize, cell.height() as usize);
        let bitmap = bitmap.filter(|b| b.len() >= w * h);
        let (fg, bg) = (pen.effective_fg(), pen.effective_bg());

        let pitch = self.surface.pitch() as usize;
        let origin = self.surface.cell_offset(row, col);
        let fb = self.memory.as_mut();
        for y in 0..h {
            let dest = &mut fb[origin + y * pitch..origin + y * pitch + w];
            match bitmap {
                Some(bits) => {
                    for (pixel, &bit) in dest.iter_mut().zip(&bits[y * w..(y + 1) * w]) {
                        *pixel = if bit != 0 { fg } else { bg };
                    }
                }
                None => dest.fill(bg),
            }
        }
    }

    /// Draw a line in `color`
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: PaletteIndex) {
        let (width, height) = (self.surface.width(), self.surface.height());
        let surface = self.surface;
        let fb = self.memory.as_mut();
        trace_line(x0, y0, x1, y1, width as i32, height as i32, |x, y| {
            let (x, y) = (x as u32, y as u32);
            if x < width && y < height {
                fb[surface.offset(x, y)] = color;
            }
        });
    }

    /// Copy a text cell's pixels into `buf`, row-major
    pub fn save_cell(&self, row: u32, col: u32, buf: &mut [u8]) {
        self.for_cell_rows(row, col, |fb_row, offset, w| {
            if let Some(dest) = buf.get_mut(offset..offset + w) {
                dest.copy_from_slice(fb_row);
            }
        });
    }

    /// Write a text cell's pixels back from `buf`
    pub fn restore_cell(&mut self, row: u32, col: u32, buf: &[u8]) {
        self.for_cell_rows_mut(row, col, |fb_row, offset, w| {
            if let Some(src) = buf.get(offset..offset + w) {
                fb_row.copy_from_slice(src);
            }
        });
    }

    /// Paint a whole text cell in one colour
    pub fn paint_cell(&mut self, row: u32, col: u32, color: PaletteIndex) {
        self.for_cell_rows_mut(row, col, |fb_row, _, _| fb_row.fill(color));
    }

    fn for_cell_rows<F>(&self, row: u32, col: u32, mut f: F)
    where
        F: FnMut(&[u8], usize, usize),
    {
        if !self.surface.contains_cell(row, col) {
            return;
        }
        let cell = self.surface.cell();
        let (w, h) = (cell.width() as usize, cell.height() as usize);
        let pitch = self.surface.pitch() as usize;
        let origin = self.surface.cell_offset(row, col);
        let fb = self.memory.as_ref();
        for y in 0..h {
            let start = origin + y * pitch;
            f(&fb[start..start + w], y * w, w);
        }
    }

    fn for_cell_rows_mut<F>(&mut self, row: u32, col: u32, mut f: F)
    where
        F: FnMut(&mut [u8], usize, usize),
    {
        if !self.surface.contains_cell(row, col) {
            return;
        }
        let cell = self.surface.cell();
        let (w, h) = (cell.width() as usize, cell.height() as usize);
        let pitch = self.surface.pitch() as usize;
        let origin = self.surface.cell_offset(row, col);
        let fb = self.memory.as_mut();
        for y in 0..h {
            let start = origin + y * pitch;
            f(&mut fb[start..start + w], y * w, w);
        }
    }
}
