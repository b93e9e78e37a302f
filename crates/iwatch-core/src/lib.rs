//! Core model for iwatch.
//!
//! Everything here is terminal-agnostic: frame storage, tab expansion, the
//! display state, and the keyboard command interpreter. The terminal crate
//! renders from these types and feeds keystrokes back in.
//!
//! # Example
//!
//! ```
//! use iwatch_core::{DisplayState, Key, KbdResult, Line, Viewport};
//!
//! let line = Line::from_text("\tOK");
//! assert_eq!(line.text(), "        OK");
//!
//! let mut state = DisplayState::new();
//! let view = Viewport::new(80, 24);
//! state.interpret(Key::Char('5'), view);
//! assert_eq!(state.interpret(Key::Char('g'), view), KbdResult::Redraw);
//! assert_eq!(state.line_offset(), 5);
//! ```
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::use_self)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]

pub mod context;
pub mod frame;
pub mod keys;
pub mod layout;
pub mod state;

pub use context::{CommandSpec, WatchContext};
pub use frame::{
    display_width, Frame, FramePair, Glyph, Line, LINE_CAPACITY, MAXCOLUMN, MAXLINE, TABSTOP,
};
pub use keys::{KbdResult, Key, Viewport};
pub use layout::{expand_tabs, layout_line};
pub use state::{DisplayState, HighlightMode, DEFAULT_INTERVAL};
