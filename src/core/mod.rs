//! Console Core Module
//!
//! Platform-independent console state. This module contains:
//! - Framebuffer geometry and the active drawing rectangle
//! - Palette colours and the drawing pen
//! - Cursor position and the cursor-cell overlay
//! - Terminal state (scroll region, modes, line attributes)
//! - Deterministic snapshot generation
//!
//! Nothing here touches pixels; rendering lives in [`crate::renderer`].

pub mod color;
mod cursor;
mod geometry;
mod snapshot;
mod tty;

pub use color::{PaletteIndex, Pen};
pub use cursor::{Cursor, CursorFrame, CursorOverlay};
pub use geometry::{CellHeight, FramebufferInfo, Surface, MAX_CELL_AREA};
pub use snapshot::{ModesSnapshot, Snapshot};
pub use tty::{LineAttribute, TtyState, MAX_LINES};
