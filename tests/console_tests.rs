//! Console integration tests
//!
//! These tests feed byte streams into a `Console` backed by an in-memory
//! framebuffer and the software accelerator, and check the resulting
//! terminal state, pixels and replies.

use std::cell::Cell;
use std::rc::Rc;

use mochi_fbcon::blit::{Accelerator, SoftwareAccelerator, Source, Transfer, WaitPolicy};
use mochi_fbcon::core::{CellHeight, Cursor, FramebufferInfo, Pen};
use mochi_fbcon::renderer::FontTable;
use mochi_fbcon::{Console, ConsoleConfig, Error};

use proptest::prelude::*;

type TestConsole = Console<Vec<u8>, SoftwareAccelerator, FontTable, Vec<u8>>;

/// 8x16 font where every glyph has a distinct pixel pattern
fn patterned_font() -> FontTable {
    let area = CellHeight::H16.area();
    let data: Vec<u8> = (0..256 * area)
        .map(|i| u8::from((i / area + i % area) % 3 == 0))
        .collect();
    FontTable::new(CellHeight::H16, data).unwrap()
}

/// 640x480 framebuffer with 8x16 cells limited to 24 lines: 80x24 text
fn console() -> TestConsole {
    let mut config = ConsoleConfig::default();
    config.line_limit = 24;
    config.wait = WaitPolicy::Bounded { max_polls: 100 };
    let info = FramebufferInfo::new(640, 480, 640);
    Console::new(
        &config,
        info,
        vec![0u8; info.size as usize],
        SoftwareAccelerator::recording(),
        patterned_font(),
        Vec::new(),
    )
    .unwrap()
}

/// Count the scroll copies in the accelerator history
fn copies(history: &[Transfer]) -> usize {
    history
        .iter()
        .filter(|t| matches!(t.source, Source::Framebuffer(_)))
        .count()
}

#[test]
fn test_clear_then_print() {
    let mut console = console();
    console.feed(b"noise\r\n\x1b[44mmore").unwrap();
    console.feed(b"\x1b[0m\x1b[2J").unwrap();
    console.feed(b"A").unwrap();

    let glyph = patterned_font().get(b'A').unwrap().to_vec();
    let renderer = console.renderer();
    for y in 0..16u32 {
        for x in 0..8u32 {
            let expected = if glyph[(y * 8 + x) as usize] != 0 { 7 } else { 0 };
            assert_eq!(renderer.pixel(x, y), Some(expected), "pixel {},{}", x, y);
        }
    }
    // Everything else is background
    for y in 0..console.surface().height() {
        for x in 8..640 {
            assert_eq!(renderer.pixel(x, y), Some(0));
        }
    }
    assert_eq!(console.tty().cursor, Cursor::new(0, 1));
}

#[test]
fn test_cursor_down_clamps() {
    let mut console = console();
    assert_eq!(console.term_size(), (24, 80));
    console.feed(b"\x1b[999B").unwrap();
    assert_eq!(console.tty().cursor.row, 23);
    console.feed(b"\x1b[999C").unwrap();
    assert_eq!(console.tty().cursor.col, 79);
    console.feed(b"\x1b[999A\x1b[999D").unwrap();
    assert_eq!(console.tty().cursor, Cursor::new(0, 0));
}

#[test]
fn test_linefeeds_scroll_inside_region() {
    let mut console = console();
    console.feed(b"\x1b[1;5r\x1b[1;1H").unwrap();
    console_history(&mut console);
    assert_eq!(console.tty().scroll_top(), 0);
    assert_eq!(console.tty().scroll_bottom(), 4);

    let mut scrolls = 0;
    for lf in 1..=20 {
        console.feed(b"\n").unwrap();
        let history = console_history(&mut console);
        scrolls += copies(&history);

        if lf < 4 {
            assert_eq!(console.tty().cursor.row, lf);
            assert_eq!(copies(&history), 0);
        } else {
            assert_eq!(console.tty().cursor.row, 3, "after linefeed {}", lf);
            assert_eq!(copies(&history), 1, "after linefeed {}", lf);
        }
    }
    assert_eq!(scrolls, 17);
}

fn console_history(console: &mut TestConsole) -> Vec<Transfer> {
    console.renderer_mut().accelerator_mut().take_history()
}

#[test]
fn test_inverted_region_is_ignored() {
    let mut console = console();
    console.feed(b"\x1b[10;5r").unwrap();
    assert_eq!(console.tty().scroll_top(), 0);
    assert_eq!(console.tty().scroll_bottom(), 23);
}

#[test]
fn test_linefeed_below_region_clamps() {
    let mut console = console();
    console.feed(b"\x1b[1;5r\x1b[10;1H").unwrap();
    for _ in 0..30 {
        console.feed(b"\n").unwrap();
    }
    assert_eq!(console.tty().cursor.row, 23);
    assert_eq!(copies(console.renderer().accelerator().history()), 0);
}

#[test]
fn test_cursor_position_report() {
    let mut console = console();
    console.feed(b"\x1b[6n").unwrap();
    assert_eq!(console.output(), b"\x1b[01;01R");

    console.output_mut().clear();
    console.feed(b"\x1b[12;34H\x1b[6n").unwrap();
    assert_eq!(console.output(), b"\x1b[12;34R");
}

#[test]
fn test_status_and_attributes_replies() {
    let mut console = console();
    console.feed(b"\x1b[5n\x1b[c").unwrap();
    assert_eq!(console.output(), b"\x1b[0n\x1b[?1;0c");
}

#[test]
fn test_sgr_reset_is_white_not_bright_white() {
    let mut console = console();
    console.feed(b"\x1b[1;31m").unwrap();
    assert_eq!(console.tty().pen.fg, 9);
    console.feed(b"\x1b[0m").unwrap();
    assert_eq!(console.tty().pen, Pen::new(7, 0));
}

#[test]
fn test_plotting_twice_is_idempotent() {
    let mut console = console();
    console.feed(b"\x1b[5;5HQ").unwrap();
    let once = console.framebuffer().to_vec();
    console.feed(b"\x1b[5;5HQ").unwrap();
    assert_eq!(console.framebuffer(), &once[..]);
}

#[test]
fn test_cursor_blink_restores_content() {
    let mut console = console();
    console.feed(b"hello\x1b[1;3H").unwrap();
    let before = console.framebuffer().to_vec();

    // Off (restore), on (solid), off (restore)
    console.tick_cursor_blink();
    console.tick_cursor_blink();
    assert_ne!(console.framebuffer(), &before[..]);
    assert_eq!(console.renderer().pixel(16, 0), Some(9));

    console.tick_cursor_blink();
    assert_eq!(console.framebuffer(), &before[..]);
}

#[test]
fn test_feeding_over_drawn_cursor_keeps_text() {
    let mut console = console();
    console.feed(b"ab\x1b[1;1H").unwrap();
    let before = console.framebuffer().to_vec();

    console.tick_cursor_blink();
    console.tick_cursor_blink();
    console.feed(b"\x1b[1;2H").unwrap();
    console.feed(b"\x1b[1;1H").unwrap();
    assert_eq!(console.framebuffer(), &before[..]);
}

#[test]
fn test_toggle_cell_height_cycles() {
    let mut console = console();
    let expected = [
        (CellHeight::H20, 0, 64),
        (CellHeight::H8, 144, 80),
        (CellHeight::H14, 72, 80),
        (CellHeight::H16, 48, 80),
    ];
    for (cell, border, cols) in expected {
        console.feed(b"\x1b[5;5Htext").unwrap();
        console.toggle_cell_height().unwrap();

        let surface = *console.surface();
        assert_eq!(surface.cell(), cell);
        assert_eq!(surface.border(), border);
        assert_eq!(surface.height(), 480 - 2 * border);
        assert_eq!(console.term_size(), (24, cols));
        assert_eq!(console.tty().cursor, Cursor::new(0, 0));
        assert!(console.framebuffer().iter().all(|&p| p == 0));
    }
}

#[test]
fn test_unlimited_lines_keep_a_margin() {
    let info = FramebufferInfo::new(640, 480, 640);
    let console = Console::new(
        &ConsoleConfig::default(),
        info,
        vec![0u8; info.size as usize],
        SoftwareAccelerator::new(),
        patterned_font(),
        Vec::new(),
    )
    .unwrap();
    assert_eq!(console.surface().border(), 8);
    assert_eq!(console.term_size(), (29, 80));
}

#[test]
fn test_long_stream_keeps_no_transfer_log() {
    let info = FramebufferInfo::new(640, 480, 640);
    let mut console = Console::new(
        &ConsoleConfig::default(),
        info,
        vec![0u8; info.size as usize],
        SoftwareAccelerator::new(),
        patterned_font(),
        Vec::new(),
    )
    .unwrap();

    console.feed(&[b'\n'; 10_000]).unwrap();
    let accel = console.renderer().accelerator();
    assert!(accel.history().is_empty());
    assert!(accel.batches() > 9_000);
    assert_eq!(console.tty().cursor.row, console.term_size().0 - 2);
}

#[test]
fn test_framebuffer_too_small() {
    let info = FramebufferInfo::new(640, 480, 640);
    let result = Console::new(
        &ConsoleConfig::default(),
        info,
        vec![0u8; 1000],
        SoftwareAccelerator::new(),
        patterned_font(),
        Vec::new(),
    );
    assert!(matches!(result, Err(Error::FramebufferTooSmall { .. })));
}

/// Executes transfers in software but reports busy while stalled
struct StallingAccelerator {
    inner: SoftwareAccelerator,
    stalled: Rc<Cell<bool>>,
}

impl Accelerator for StallingAccelerator {
    fn enqueue(&mut self, transfer: Transfer) {
        self.inner.enqueue(transfer);
    }

    fn execute_queue(&mut self, framebuffer: &mut [u8]) {
        self.inner.execute_queue(framebuffer);
    }

    fn is_busy(&self) -> bool {
        self.stalled.get()
    }
}

#[test]
fn test_accelerator_timeout() {
    let stalled = Rc::new(Cell::new(false));
    let mut config = ConsoleConfig::default();
    config.wait = WaitPolicy::Bounded { max_polls: 10 };
    let info = FramebufferInfo::new(640, 480, 640);
    let mut console = Console::new(
        &config,
        info,
        vec![0u8; info.size as usize],
        StallingAccelerator {
            inner: SoftwareAccelerator::new(),
            stalled: Rc::clone(&stalled),
        },
        patterned_font(),
        Vec::new(),
    )
    .unwrap();

    // Glyphs are drawn by the CPU and never wait
    stalled.set(true);
    assert!(console.feed(b"abc").is_ok());

    let result = console.feed(b"\x1b[2J");
    assert!(matches!(result, Err(Error::AcceleratorTimeout { polls: 10 })));

    stalled.set(false);
    assert!(console.feed(b"\x1b[2J").is_ok());
}

#[test]
fn test_same_stream_same_snapshot() {
    let stream = b"\x1b[2;20r\x1b[5;5HHello\x1b[1;33m\r\nWorld\x1b[s\x1b[?25l\x1b#3\tX\x1b[u";
    let mut a = console();
    let mut b = console();
    a.feed(stream).unwrap();
    b.feed(&stream[..10]).unwrap();
    b.feed(&stream[10..]).unwrap();

    assert_eq!(a.snapshot(), b.snapshot());
    assert_eq!(a.framebuffer(), b.framebuffer());
    assert_eq!(a.snapshot().cursor, Cursor::new(5, 5));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_arbitrary_input_keeps_cursor_in_bounds(input in proptest::collection::vec(any::<u8>(), 0..512)) {
        let mut console = console();
        console.feed(&input).unwrap();

        let (rows, cols) = console.term_size();
        let tty = console.tty();
        prop_assert!(tty.cursor.row < rows);
        prop_assert!(tty.cursor.col < cols);
        prop_assert!(tty.scroll_top() <= tty.scroll_bottom());
        prop_assert!(tty.scroll_bottom() < rows);

        // Nothing outside the active rectangle is ever drawn
        let base = console.surface().base();
        let active_end = base + console.surface().size();
        prop_assert!(console.framebuffer()[..base].iter().all(|&p| p == 0));
        prop_assert!(console.framebuffer()[active_end..].iter().all(|&p| p == 0));
    }
}
