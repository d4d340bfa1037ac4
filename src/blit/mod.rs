//! Block-transfer accelerator interface
//!
//! Bulk pixel movement (fills, scroll copies) is described as [`Transfer`]
//! descriptors, queued on an [`Accelerator`], executed, and then awaited
//! before the primitive that issued them returns. Offsets are byte offsets
//! from the start of the framebuffer memory, so a hardware backend can turn
//! them into bus addresses and the [`SoftwareAccelerator`] can run them
//! against a plain slice.

mod software;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::core::color::{fill_word, PaletteIndex};
use crate::error::{Error, Result};

pub use software::SoftwareAccelerator;

bitflags! {
    /// Transfer information flags, laid out like the engine's TI register
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TransferFlags: u32 {
        /// 2-D mode: `rows` runs of `width` bytes separated by a stride
        const TWO_D = 1 << 1;
        /// Destination address increments after each write
        const DEST_INC = 1 << 4;
        /// Source address increments after each read
        const SRC_INC = 1 << 8;
    }
}

/// Where a transfer reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Four repeated colour words in DMA-visible memory
    Pattern([u32; 4]),
    /// Byte offset into the framebuffer
    Framebuffer(usize),
}

/// How many bytes a transfer moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extent {
    /// A contiguous run of bytes
    Linear(usize),
    /// `rows` runs of `width` bytes
    Block { width: usize, rows: usize },
}

/// A single transfer descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub source: Source,
    /// Destination byte offset into the framebuffer
    pub dest: usize,
    pub extent: Extent,
    /// Bytes skipped at the destination after each block row
    pub dest_stride: usize,
    pub flags: TransferFlags,
}

impl Transfer {
    /// Fill `len` contiguous bytes with a colour
    pub fn fill(dest: usize, len: usize, color: PaletteIndex) -> Self {
        Self {
            source: Source::Pattern([fill_word(color); 4]),
            dest,
            extent: Extent::Linear(len),
            dest_stride: 0,
            flags: TransferFlags::DEST_INC,
        }
    }

    /// Fill a `width` x `rows` rectangle whose rows are `width + dest_stride`
    /// bytes apart
    pub fn fill_block(
        dest: usize,
        width: usize,
        rows: usize,
        dest_stride: usize,
        color: PaletteIndex,
    ) -> Self {
        Self {
            source: Source::Pattern([fill_word(color); 4]),
            dest,
            extent: Extent::Block { width, rows },
            dest_stride,
            flags: TransferFlags::DEST_INC | TransferFlags::TWO_D,
        }
    }

    /// Copy `len` contiguous bytes within the framebuffer
    pub fn copy(src: usize, dest: usize, len: usize) -> Self {
        Self {
            source: Source::Framebuffer(src),
            dest,
            extent: Extent::Linear(len),
            dest_stride: 0,
            flags: TransferFlags::SRC_INC | TransferFlags::DEST_INC,
        }
    }

    /// Total bytes written
    pub fn bytes(&self) -> usize {
        match self.extent {
            Extent::Linear(len) => len,
            Extent::Block { width, rows } => width * rows,
        }
    }

    /// Transfer length register word: the byte count, or in 2-D mode
    /// `(rows - 1) << 16 | width`
    pub fn length_word(&self) -> u32 {
        match self.extent {
            Extent::Linear(len) => len as u32,
            Extent::Block { width, rows } => {
                ((rows.saturating_sub(1) as u32 & 0xFFFF) << 16) | (width as u32 & 0xFFFF)
            }
        }
    }

    /// Stride register word: destination stride in bits 31:16, source
    /// stride (always zero here) in bits 15:0
    pub fn stride_word(&self) -> u32 {
        (self.dest_stride as u32 & 0xFFFF) << 16
    }
}

/// A block-transfer engine
pub trait Accelerator {
    /// Queue a descriptor
    fn enqueue(&mut self, transfer: Transfer);

    /// Start executing everything queued so far, in order
    fn execute_queue(&mut self, framebuffer: &mut [u8]);

    /// Whether the engine is still working through the queue
    fn is_busy(&self) -> bool;
}

/// How long to poll for the engine to go idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WaitPolicy {
    /// Spin until idle, however long that takes
    Spin,
    /// Give up after `max_polls` busy polls
    Bounded { max_polls: u32 },
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy::Bounded {
            max_polls: 1_000_000,
        }
    }
}

/// Poll the engine until it reports idle
pub fn wait_idle<A: Accelerator + ?Sized>(accel: &A, policy: WaitPolicy) -> Result<()> {
    let mut polls: u32 = 0;
    while accel.is_busy() {
        if let WaitPolicy::Bounded { max_polls } = policy {
            if polls >= max_polls {
                log::warn!("Accelerator stalled after {} polls", polls);
                return Err(Error::AcceleratorTimeout { polls });
            }
        }
        polls = polls.saturating_add(1);
        std::hint::spin_loop();
    }
    Ok(())
}
