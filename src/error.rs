//! Error types for console operations

use thiserror::Error;

/// Console error type
#[derive(Error, Debug)]
pub enum Error {
    /// The block-transfer engine never reported idle within the poll budget
    #[error("Accelerator still busy after {polls} polls")]
    AcceleratorTimeout { polls: u32 },

    /// Requested glyph cell height is not one of 8, 14, 16 or 20
    #[error("Unsupported cell height: {0}")]
    UnsupportedCellHeight(u32),

    /// Framebuffer memory does not cover `pitch * height` bytes
    #[error("Framebuffer too small: need {required} bytes, have {actual}")]
    FramebufferTooSmall { required: usize, actual: usize },

    /// Row pitch narrower than the visible width
    #[error("Pitch {pitch} is narrower than width {width}")]
    PitchTooNarrow { pitch: u32, width: u32 },

    /// Configuration could not be parsed or serialized
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for console operations
pub type Result<T> = std::result::Result<T, Error>;
