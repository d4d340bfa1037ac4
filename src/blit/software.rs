//! CPU-backed accelerator
//!
//! Executes transfer descriptors synchronously against the framebuffer
//! slice. Used by the headless runner and by tests. A recording instance
//! also keeps every executed descriptor so tests can check what was
//! submitted; the default one keeps nothing.

use super::{Accelerator, Extent, Source, Transfer, TransferFlags};

/// Runs descriptors on the CPU
#[derive(Debug, Default)]
pub struct SoftwareAccelerator {
    queue: Vec<Transfer>,
    history: Vec<Transfer>,
    recording: bool,
    /// Number of `execute_queue` calls that found work
    batches: usize,
}

impl SoftwareAccelerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// An accelerator that records every executed descriptor
    pub fn recording() -> Self {
        Self {
            recording: true,
            ..Self::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    /// Descriptors executed so far, oldest first (empty unless recording)
    pub fn history(&self) -> &[Transfer] {
        &self.history
    }

    /// Drain the execution history
    pub fn take_history(&mut self) -> Vec<Transfer> {
        std::mem::take(&mut self.history)
    }

    /// Number of non-empty batches executed
    pub fn batches(&self) -> usize {
        self.batches
    }

    fn run(transfer: &Transfer, framebuffer: &mut [u8]) {
        match transfer.extent {
            Extent::Linear(len) => {
                Self::span(transfer, framebuffer, 0, transfer.dest, len);
            }
            Extent::Block { width, rows } => {
                let row_step = width + transfer.dest_stride;
                for row in 0..rows {
                    Self::span(
                        transfer,
                        framebuffer,
                        row * width,
                        transfer.dest + row * row_step,
                        width,
                    );
                }
            }
        }
    }

    /// Move one contiguous run; `read` counts source bytes consumed so far
    fn span(transfer: &Transfer, framebuffer: &mut [u8], read: usize, dest: usize, len: usize) {
        let end = dest.saturating_add(len).min(framebuffer.len());
        if dest >= end {
            log::warn!("Transfer outside framebuffer: {:?}", transfer);
            return;
        }
        let len = end - dest;

        match transfer.source {
            Source::Pattern(words) => {
                let mut pattern = [0u8; 16];
                for (chunk, word) in pattern.chunks_exact_mut(4).zip(words) {
                    chunk.copy_from_slice(&word.to_ne_bytes());
                }
                // Without source increment the engine re-reads the first word
                let period = if transfer.flags.contains(TransferFlags::SRC_INC) {
                    16
                } else {
                    4
                };
                for (i, byte) in framebuffer[dest..end].iter_mut().enumerate() {
                    *byte = pattern[(read + i) % period];
                }
            }
            Source::Framebuffer(src) => {
                let src = src + read;
                let src_end = src.saturating_add(len).min(framebuffer.len());
                if src >= src_end {
                    log::warn!("Transfer source outside framebuffer: {:?}", transfer);
                    return;
                }
                framebuffer.copy_within(src..src_end, dest);
            }
        }
    }
}

impl Accelerator for SoftwareAccelerator {
    fn enqueue(&mut self, transfer: Transfer) {
        self.queue.push(transfer);
    }

    fn execute_queue(&mut self, framebuffer: &mut [u8]) {
        if self.queue.is_empty() {
            return;
        }
        self.batches += 1;
        for transfer in self.queue.drain(..) {
            Self::run(&transfer, framebuffer);
            if self.recording {
                self.history.push(transfer);
            }
        }
    }

    fn is_busy(&self) -> bool {
        false
    }
}
