//! Scanner State Machine
//!
//! A byte-at-a-time scanner for the VT100/ANSI subset the console
//! understands. Each byte runs through one explicit transition
//! `(state, byte) -> (state, action)`; completed sequences come out as
//! [`Action`]s for the console to apply.
//!
//! States:
//! - NormalText: plain text (initial state, every sequence returns here)
//! - WaitBracket: after ESC
//! - SelectEscape: after `ESC [`, before a private marker or first digit
//! - ReadDigit: accumulating numeric parameters
//! - DoublePending: after `ESC #`, waiting for the line attribute byte
//!
//! CR, LF, HT, BS, SO, SI and BEL are intercepted before the state machine
//! and never change its state, so they may appear inside a sequence.

use super::action::{Action, ControlCode, CsiAction};
use super::params::Params;
use crate::core::LineAttribute;

const ESC: u8 = 0x1B;

/// Scanner state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    #[default]
    NormalText,
    WaitBracket,
    SelectEscape,
    ReadDigit,
    DoublePending,
}

/// The escape-sequence scanner
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    state: State,
    /// Parameters of the sequence being read
    params: Params,
    /// `?` or `#` seen right after `ESC [`
    private_marker: Option<u8>,
}

impl Scanner {
    /// Create a new scanner in the normal text state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Parameters collected so far
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Reset to normal text, dropping any partial sequence
    pub fn reset(&mut self) {
        self.state = State::NormalText;
        self.params.clear();
        self.private_marker = None;
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        data.iter().filter_map(|&byte| self.advance(byte)).collect()
    }

    /// Process a single byte
    pub fn advance(&mut self, byte: u8) -> Option<Action> {
        if let Some(code) = ControlCode::from_byte(byte) {
            return Some(Action::Control(code));
        }

        let (next, action) = self.transition(byte);
        self.state = next;
        action
    }

    fn transition(&mut self, byte: u8) -> (State, Option<Action>) {
        match self.state {
            State::NormalText => self.normal_text(byte),
            State::WaitBracket => self.wait_bracket(byte),
            State::SelectEscape => self.select_escape(byte),
            State::ReadDigit => self.read_digit(byte),
            State::DoublePending => self.double_pending(byte),
        }
    }

    fn normal_text(&mut self, byte: u8) -> (State, Option<Action>) {
        if byte == ESC {
            (State::WaitBracket, None)
        } else {
            (State::NormalText, Some(Action::Print(byte)))
        }
    }

    fn wait_bracket(&mut self, byte: u8) -> (State, Option<Action>) {
        match byte {
            b'[' => {
                self.params.clear();
                self.private_marker = None;
                (State::SelectEscape, None)
            }
            b'#' => (State::DoublePending, None),
            // ESC ESC prints the escape glyph itself
            ESC => (State::NormalText, Some(Action::Print(ESC))),
            b'c' => (State::NormalText, Some(Action::FullReset)),
            _ => {
                log::trace!("Abandoned escape sequence at {:#04x}", byte);
                (State::NormalText, None)
            }
        }
    }

    fn select_escape(&mut self, byte: u8) -> (State, Option<Action>) {
        match byte {
            b'0'..=b'9' => {
                self.params.push(u32::from(byte - b'0'));
                (State::ReadDigit, None)
            }
            b'?' | b'#' => {
                self.private_marker = Some(byte);
                self.params.push(0);
                (State::ReadDigit, None)
            }
            _ => self.final_letter(byte),
        }
    }

    fn read_digit(&mut self, byte: u8) -> (State, Option<Action>) {
        match byte {
            b'0'..=b'9' => {
                self.params.push_digit(byte - b'0');
                (State::ReadDigit, None)
            }
            b';' => {
                self.params.push(0);
                (State::ReadDigit, None)
            }
            _ => self.final_letter(byte),
        }
    }

    fn double_pending(&mut self, byte: u8) -> (State, Option<Action>) {
        let attribute = match byte {
            b'3' => Some(LineAttribute::DoubleHeightTop),
            b'4' => Some(LineAttribute::DoubleHeightBottom),
            b'5' => Some(LineAttribute::SingleWidth),
            _ => None,
        };
        (State::NormalText, attribute.map(Action::LineAttribute))
    }

    fn final_letter(&mut self, byte: u8) -> (State, Option<Action>) {
        if self.params.overflowed() {
            log::trace!("Dropped control sequence parameters past capacity");
        }
        let csi = CsiAction {
            final_byte: byte,
            params: self.params,
            private_marker: self.private_marker,
        };
        self.params.clear();
        (State::NormalText, Some(Action::Csi(csi)))
    }
}
