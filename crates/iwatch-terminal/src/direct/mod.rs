//! Direct terminal backend.
//!
//! Everything drawn on screen goes through a [`CellBuffer`] and is pushed to
//! crossterm by the [`DiffRenderer`].
//!
//! # Architecture
//!
//! ```text
//! painters → CellBuffer → DiffRenderer → crossterm
//!               ↑              ↑             ↑
//!          dirty bits     shadow diff       I/O
//! ```
//!
//! # Key Features
//!
//! - **Inline symbols**: Uses `CompactString` for cell content
//! - **Smart diffing**: Only renders cells that changed on screen
//! - **Batched I/O**: Single `write()` syscall per frame

mod cell_buffer;
mod diff_renderer;

pub use cell_buffer::{Cell, CellBuffer, Modifiers};
pub use diff_renderer::DiffRenderer;
