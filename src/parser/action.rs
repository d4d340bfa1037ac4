//! Scanner Actions
//!
//! Semantic operations produced by the scanner that the console applies to
//! its state and framebuffer.

use super::params::Params;
use crate::core::LineAttribute;

/// An action produced by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Plot the glyph for this code point at the cursor, then advance
    Print(u8),

    /// Execute an intercepted control character
    Control(ControlCode),

    /// Execute a completed `ESC [` control sequence
    Csi(CsiAction),

    /// `ESC c` - reset attributes, home the cursor and clear the screen
    FullReset,

    /// `ESC # 3/4/5` - line size attribute for the cursor row
    LineAttribute(LineAttribute),
}

/// Control characters handled outside the escape state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// CR - Carriage Return
    CarriageReturn,
    /// LF - Line Feed
    LineFeed,
    /// HT - Horizontal Tab
    Tab,
    /// BS - Backspace
    Backspace,
    /// SO - Shift Out (absorbed)
    ShiftOut,
    /// SI - Shift In (absorbed)
    ShiftIn,
    /// BEL - Bell (absorbed)
    Bell,
}

impl ControlCode {
    /// Classify a byte, if it is one of the intercepted controls
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'\r' => Some(ControlCode::CarriageReturn),
            b'\n' => Some(ControlCode::LineFeed),
            0x09 => Some(ControlCode::Tab),
            0x08 => Some(ControlCode::Backspace),
            0x0E => Some(ControlCode::ShiftOut),
            0x0F => Some(ControlCode::ShiftIn),
            0x07 => Some(ControlCode::Bell),
            _ => None,
        }
    }
}

/// A completed control sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsiAction {
    /// The final byte that identifies the command
    pub final_byte: u8,
    /// Numeric parameters
    pub params: Params,
    /// Private mode marker (`?` or `#`)
    pub private_marker: Option<u8>,
}

impl CsiAction {
    pub fn new(final_byte: u8) -> Self {
        Self {
            final_byte,
            params: Params::new(),
            private_marker: None,
        }
    }

    /// Builder used by tests and hosts that synthesise sequences
    pub fn with_params(final_byte: u8, params: &[u32]) -> Self {
        Self {
            final_byte,
            params: Params::from_slice(params),
            private_marker: None,
        }
    }

    /// Get parameter at index, or default value if not present
    pub fn param(&self, index: usize, default: u32) -> u32 {
        self.params.get_or(index, default)
    }

    /// Number of parameters collected
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Whether the sequence carried the DEC private marker `?`
    pub fn is_dec_private(&self) -> bool {
        self.private_marker == Some(b'?')
    }
}
