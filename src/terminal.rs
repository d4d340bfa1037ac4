//! Console Executor
//!
//! Ties together the scanner, the terminal state and the renderer, and
//! applies scanned actions to both. This is the main integration point and
//! the host-facing API: one `Console` owns one framebuffer, so independent
//! consoles can coexist.

use crate::blit::Accelerator;
use crate::config::ConsoleConfig;
use crate::core::color::{BRIGHT_BIT, BRIGHT_WHITE, WHITE};
use crate::core::{
    CellHeight, CursorFrame, CursorOverlay, FramebufferInfo, PaletteIndex, Pen, Snapshot, Surface,
    TtyState,
};
use crate::error::Result;
use crate::parser::{Action, ControlCode, CsiAction, Scanner};
use crate::renderer::{GlyphStore, Renderer};

/// Channel for replies to device status queries
pub trait OutputChannel {
    fn write(&mut self, bytes: &[u8]);
}

impl OutputChannel for Vec<u8> {
    fn write(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

impl<T: OutputChannel + ?Sized> OutputChannel for &mut T {
    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes);
    }
}

/// A framebuffer console
pub struct Console<M, A, G, O> {
    tty: TtyState,
    scanner: Scanner,
    overlay: CursorOverlay,
    renderer: Renderer<M, A>,
    glyphs: G,
    output: O,
}

impl<M, A, G, O> Console<M, A, G, O>
where
    M: AsRef<[u8]> + AsMut<[u8]>,
    A: Accelerator,
    G: GlyphStore,
    O: OutputChannel,
{
    /// Attach a console to a framebuffer.
    ///
    /// Fails if `memory` does not cover the framebuffer described by
    /// `info`. The whole framebuffer is cleared to the background colour.
    pub fn new(
        config: &ConsoleConfig,
        info: FramebufferInfo,
        memory: M,
        accel: A,
        glyphs: G,
        output: O,
    ) -> Result<Self> {
        let surface = Surface::new(info, config.cell_height, config.line_limit);
        let renderer = Renderer::new(memory, accel, surface, config.wait)?;
        let pen = Pen::new(config.colors.foreground, config.colors.background);

        let mut console = Self {
            tty: TtyState::new(surface.rows(), surface.cols(), pen),
            scanner: Scanner::new(),
            overlay: CursorOverlay::new(config.colors.cursor),
            renderer,
            glyphs,
            output,
        };
        console.apply_geometry()?;
        Ok(console)
    }

    /// Terminal state
    pub fn tty(&self) -> &TtyState {
        &self.tty
    }

    /// Active drawing rectangle
    pub fn surface(&self) -> &Surface {
        self.renderer.surface()
    }

    /// The renderer (framebuffer contents and accelerator)
    pub fn renderer(&self) -> &Renderer<M, A> {
        &self.renderer
    }

    /// Direct access to the renderer; drawing through it bypasses the
    /// cursor overlay
    pub fn renderer_mut(&mut self) -> &mut Renderer<M, A> {
        &mut self.renderer
    }

    /// The whole physical framebuffer
    pub fn framebuffer(&self) -> &[u8] {
        self.renderer.framebuffer()
    }

    pub fn overlay(&self) -> &CursorOverlay {
        &self.overlay
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    /// Capture the terminal state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.tty, self.renderer.surface())
    }

    /// Text rows and columns
    pub fn term_size(&self) -> (u32, u32) {
        (self.tty.rows(), self.tty.cols())
    }

    /// Give back the framebuffer memory, accelerator, glyph store and
    /// output channel
    pub fn into_parts(self) -> (M, A, G, O) {
        let (memory, accel) = self.renderer.into_parts();
        (memory, accel, self.glyphs, self.output)
    }

    /// Switch to another glyph cell height
    pub fn set_cell_height(&mut self, cell: CellHeight) -> Result<()> {
        self.renderer.set_cell_height(cell);
        self.apply_geometry()
    }

    /// Cycle the cell height 8 -> 14 -> 16 -> 20 -> 8
    pub fn toggle_cell_height(&mut self) -> Result<()> {
        let next = self.renderer.surface().cell().next();
        self.set_cell_height(next)
    }

    /// Limit the number of text lines (0 = as many as fit)
    pub fn set_line_limit(&mut self, line_limit: u32) -> Result<()> {
        self.renderer.set_line_limit(line_limit);
        self.apply_geometry()
    }

    /// Clear everything and re-derive the text grid after the surface
    /// changed
    fn apply_geometry(&mut self) -> Result<()> {
        self.renderer.clear_full(self.tty.pen.effective_bg())?;

        let surface = *self.renderer.surface();
        self.tty.resize(surface.rows(), surface.cols());
        self.overlay.invalidate();
        self.save_cursor_cell();

        log::debug!(
            "Geometry: {}x{} cells of {}x{}, border {}",
            surface.cols(),
            surface.rows(),
            surface.cell().width(),
            surface.cell().height(),
            surface.border()
        );
        Ok(())
    }

    /// Feed a batch of bytes through the scanner
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        self.restore_cursor_cell();
        let result = self.process(bytes);
        self.save_cursor_cell();
        result
    }

    /// Feed bytes up to (not including) the first NUL
    pub fn feed_until_nul(&mut self, bytes: &[u8]) -> Result<()> {
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.feed(&bytes[..end])
    }

    fn process(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            if let Some(action) = self.scanner.advance(byte) {
                self.apply_action(action)?;
            }
            if self.tty.wrap_column() {
                self.scroll_region_up()?;
            }
        }
        Ok(())
    }

    /// Flip the cursor blink phase and redraw the cursor cell
    pub fn tick_cursor_blink(&mut self) {
        self.overlay.toggle_blink();
        self.render_cursor();
    }

    /// Draw the cursor cell for the current blink phase, if it changed
    pub fn render_cursor(&mut self) {
        let (row, col) = (self.tty.cursor.row, self.tty.cursor.col);
        match self.overlay.next_frame(self.tty.cursor_visible) {
            Some(CursorFrame::Solid(color)) => self.renderer.paint_cell(row, col, color),
            Some(CursorFrame::Restore) => {
                self.renderer.restore_cell(row, col, self.overlay.backing())
            }
            None => {}
        }
    }

    fn save_cursor_cell(&mut self) {
        let (row, col) = (self.tty.cursor.row, self.tty.cursor.col);
        self.renderer
            .save_cell(row, col, self.overlay.backing_mut());
    }

    fn restore_cursor_cell(&mut self) {
        let (row, col) = (self.tty.cursor.row, self.tty.cursor.col);
        self.renderer.restore_cell(row, col, self.overlay.backing());
    }

    /// Fill a pixel rectangle with the effective foreground
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        let color = self.tty.pen.effective_fg();
        self.renderer.fill_rect(x, y, width, height, color)
    }

    /// Fill a pixel rectangle with the effective background
    pub fn clear_rect(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        let color = self.tty.pen.effective_bg();
        self.renderer.fill_rect(x, y, width, height, color)
    }

    /// Draw a line in the effective foreground
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        let color = self.tty.pen.effective_fg();
        self.renderer.line(x0, y0, x1, y1, color);
    }

    pub fn set_fg(&mut self, color: PaletteIndex) {
        self.tty.pen.fg = color;
    }

    pub fn set_bg(&mut self, color: PaletteIndex) {
        self.tty.pen.bg = color;
    }

    /// Toggle inverse video
    pub fn swap_fg_bg(&mut self) {
        self.tty.pen.swap();
    }

    /// White on black, inverse off
    pub fn reset_attributes(&mut self) {
        self.tty.pen.reset();
    }

    pub fn set_wraparound(&mut self, on: bool) {
        self.tty.wraparound = on;
    }

    pub fn set_cursor_visibility(&mut self, visible: bool) {
        self.tty.cursor_visible = visible;
    }

    /// Apply a single scanned action
    fn apply_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Print(code) => self.print(code),
            Action::Control(code) => self.execute_control(code)?,
            Action::Csi(csi) => self.execute_csi(&csi)?,
            Action::FullReset => {
                self.tty.pen.reset();
                self.tty.move_cursor(0, 0);
                self.renderer.clear(self.tty.pen.effective_bg())?;
            }
            Action::LineAttribute(attribute) => self.tty.set_line_attribute(attribute),
        }
        Ok(())
    }

    fn print(&mut self, code: u8) {
        let cell = self.renderer.surface().cell();
        let glyph = self.glyphs.glyph(code, cell);
        let (row, col) = (self.tty.cursor.row, self.tty.cursor.col);
        self.renderer.put_glyph(row, col, glyph, &self.tty.pen);
        self.tty.cursor.col += 1;
    }

    fn execute_control(&mut self, code: ControlCode) -> Result<()> {
        match code {
            ControlCode::CarriageReturn => self.tty.carriage_return(),
            ControlCode::LineFeed => {
                if self.tty.line_feed() {
                    self.scroll_region_up()?;
                }
            }
            ControlCode::Tab => self.tty.tab(),
            ControlCode::Backspace => self.tty.backspace(),
            ControlCode::ShiftOut | ControlCode::ShiftIn | ControlCode::Bell => {}
        }
        Ok(())
    }

    fn scroll_region_up(&mut self) -> Result<()> {
        let (top, bottom) = (self.tty.scroll_top(), self.tty.scroll_bottom());
        self.renderer
            .scroll_up(top, bottom, 1, self.tty.pen.effective_bg())
    }

    /// Clear text rows `from..=to`
    fn clear_rows(&mut self, from: u32, to: u32) -> Result<()> {
        let bg = self.tty.pen.effective_bg();
        self.renderer.clear_rows(from, to, bg)
    }

    /// Clear part of the cursor row, from pixel column `x` for `width`
    fn clear_in_line(&mut self, x: u32, width: u32) -> Result<()> {
        let h = self.renderer.surface().cell().height();
        let y = self.tty.cursor.row * h;
        self.clear_rect(x, y, width, h)
    }

    /// Execute a completed control sequence
    fn execute_csi(&mut self, csi: &CsiAction) -> Result<()> {
        let cell_w = self.renderer.surface().cell().width();
        let width = self.renderer.surface().width();
        let (row, col) = (self.tty.cursor.row, self.tty.cursor.col);

        match csi.final_byte {
            b'h' | b'l' => {
                // DECSET / DECRST
                if csi.is_dec_private() && csi.param_count() == 1 {
                    let on = csi.final_byte == b'h';
                    match csi.param(0, 0) {
                        7 => self.tty.wraparound = on,
                        25 => self.tty.cursor_visible = on,
                        mode => log::trace!("Unhandled DEC mode {}", mode),
                    }
                }
            }

            // Cursor movement
            b'A' => self.tty.move_cursor_up(csi.param(0, 1)),
            b'B' => self.tty.move_cursor_down(csi.param(0, 1)),
            b'C' => self.tty.move_cursor_forward(csi.param(0, 1)),
            b'D' => self.tty.move_cursor_backward(csi.param(0, 1)),
            b'H' | b'f' => {
                // CUP - Cursor Position, HVP
                let r = i64::from(csi.param(0, 1)) - 1;
                let c = i64::from(csi.param(1, 1)) - 1;
                self.tty.move_cursor(r, c);
            }
            b's' => self.tty.save_cursor(),
            b'u' => self.tty.restore_cursor(),

            // Erase operations
            b'J' => match csi.param(0, 0) {
                0 => self.clear_rows(row, self.tty.rows().saturating_sub(1))?,
                1 => self.clear_rows(0, row)?,
                2 => {
                    self.tty.move_cursor(0, 0);
                    let bg = self.tty.pen.effective_bg();
                    self.renderer.clear(bg)?;
                }
                mode => log::trace!("Unhandled erase-in-display mode {}", mode),
            },
            b'K' => match (csi.param_count(), csi.param(0, 0)) {
                (0, _) | (1, 0) => self.clear_in_line(col * cell_w, width)?,
                (1, 1) => self.clear_in_line(0, (col + 1) * cell_w)?,
                (1, 2) => self.clear_in_line(0, width)?,
                _ => log::trace!("Unhandled erase-in-line {:?}", csi.params),
            },

            // Insert/Delete lines inside the scroll region
            b'L' | b'M' => {
                if self.tty.in_scroll_region() {
                    let bottom = self.tty.scroll_bottom();
                    let n = csi.param(0, 1).min(bottom - row);
                    let bg = self.tty.pen.effective_bg();
                    if csi.final_byte == b'L' {
                        self.renderer.scroll_down(row, bottom, n, bg)?;
                    } else {
                        self.renderer.scroll_up(row, bottom, n, bg)?;
                    }
                }
            }
            b'@' | b'P' => {
                // ICH / DCH are accepted and ignored
            }

            b'm' => self.execute_sgr(csi),

            // Device queries
            b'c' => {
                if csi.param_count() == 0 || csi.param(0, 0) == 0 {
                    self.output.write(b"\x1b[?1;0c");
                }
            }
            b'n' => {
                if csi.param_count() == 1 {
                    match csi.param(0, 0) {
                        5 => self.output.write(b"\x1b[0n"),
                        6 => {
                            let report = format!("\x1b[{:02};{:02}R", row + 1, col + 1);
                            self.output.write(report.as_bytes());
                        }
                        _ => {}
                    }
                }
            }

            b'r' => {
                // DECSTBM - Set Top and Bottom Margins
                if csi.param_count() == 2 {
                    let (top, bottom) = (csi.param(0, 0), csi.param(1, 0));
                    if !self.tty.set_scroll_region(top, bottom) {
                        log::trace!("Ignored scroll region {};{}", top, bottom);
                    }
                } else {
                    self.tty.reset_scroll_region();
                }
            }

            other => {
                log::trace!("Unhandled control sequence final {:?}", other as char);
            }
        }
        Ok(())
    }

    /// Execute SGR (Select Graphic Rendition)
    fn execute_sgr(&mut self, csi: &CsiAction) {
        let params = csi.params.as_slice();
        let pen = &mut self.tty.pen;

        if params.is_empty() {
            pen.reset();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let p = params[i];

            // 38;5;N / 48;5;N - 256-colour palette index
            if (p == 38 || p == 48) && i + 2 < params.len() && params[i + 1] == 5 {
                let index = params[i + 2] as PaletteIndex;
                if p == 38 {
                    pen.fg = index;
                } else {
                    pen.bg = index;
                }
                i += 3;
                continue;
            }

            match p {
                0 => pen.reset(),
                1 => pen.fg |= BRIGHT_BIT,
                2 => pen.fg &= BRIGHT_BIT - 1,
                3 | 7 => pen.inverse = true,
                27 => pen.inverse = false,
                30..=37 => pen.fg = (pen.fg & BRIGHT_BIT) | (p - 30) as PaletteIndex,
                39 => pen.fg = BRIGHT_WHITE,
                40..=47 => pen.bg = (p - 40) as PaletteIndex,
                49 => pen.bg = WHITE,
                _ => log::trace!("Unhandled SGR parameter {}", p),
            }
            i += 1;
        }
    }
}
