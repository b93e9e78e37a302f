//! Terminal front end for iwatch.
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::use_self)] // "unnecessary structure name repetition"
#![allow(clippy::uninlined_format_args)] // "variables can be used directly in format!"
#![allow(clippy::needless_range_loop)] // "loop variable only used to index"
#![allow(clippy::match_same_arms)] // "match arms have identical bodies"
#![allow(clippy::struct_excessive_bools)] // Cli has one flag per mode
#![allow(clippy::items_after_statements)]
#![allow(clippy::doc_markdown)]
//!
//! Renders [`iwatch_core`] frames with `crossterm`, diffing each screen
//! against the last so only changed cells reach the terminal.
//!
//! # Architecture
//!
//! - [`runner`] spawns the watched command and lays its output into a frame
//! - [`highlight`], [`status`], and [`help`] paint into a [`CellBuffer`]
//! - [`DiffRenderer`] turns the buffer into escape sequences
//! - [`App`] owns the refresh and input loop
//!
//! # Example
//!
//! ```no_run
//! use iwatch_core::{CommandSpec, DisplayState, WatchContext};
//! use iwatch_terminal::{signals, App};
//!
//! let command = CommandSpec::new(vec!["date".into()]).unwrap();
//! let ctx = WatchContext::new(command, DisplayState::new());
//! let mut app = App::new(ctx, signals::shutdown_flag().unwrap());
//! app.run().unwrap();
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod direct;
mod error;
pub mod help;
pub mod highlight;
mod input;
pub mod logging;
pub mod runner;
pub mod signals;
pub mod status;

pub use app::{
    install_panic_hook, poll_timeout, App, CrosstermBackend, CrosstermTerminal, GenericTerminal,
    RunStats, Terminal, TerminalBackend, TestableBackend, TuiConfig, DEFAULT_TICK_RATE_MS,
};
pub use cli::Cli;
pub use config::{FileConfig, Settings};
pub use direct::{Cell, CellBuffer, DiffRenderer, Modifiers};
pub use error::WatchError;
pub use input::{InputEvent, InputHandler};
