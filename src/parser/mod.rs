//! Terminal escape sequence scanner
//!
//! A byte-at-a-time scanner that converts the VT100/ANSI subset understood
//! by the console into [`Action`]s.

mod action;
mod params;
mod state;

pub use action::{Action, ControlCode, CsiAction};
pub use params::{Params, MAX_PARAMS};
pub use state::{Scanner, State};
