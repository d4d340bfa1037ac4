//! Mochi Framebuffer Console Library
//!
//! The display core of a bare-metal framebuffer console: it interprets a
//! byte stream containing VT100/ANSI control sequences and renders text,
//! cursor and screen-control effects straight into a linear 8-bit
//! framebuffer, handing bulk pixel movement to a block-transfer engine.
//!
//! - `core`: Geometry, pen colours, terminal state, cursor overlay, snapshots
//! - `parser`: Escape sequence scanner
//! - `blit`: Transfer descriptors and the accelerator interface
//! - `renderer`: Blit primitives, line drawing, glyph tables
//! - `terminal`: The `Console` tying it all together

pub mod blit;
pub mod config;
pub mod core;
pub mod error;
pub mod parser;
pub mod renderer;
pub mod terminal;

pub use config::ConsoleConfig;
pub use error::{Error, Result};
pub use terminal::{Console, OutputChannel};
