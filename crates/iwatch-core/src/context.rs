//! The watched command and the context object threaded through every step.

use crate::frame::FramePair;
use crate::state::DisplayState;

/// The command to re-execute, fixed for the life of the process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    argv: Vec<String>,
    display: String,
}

impl CommandSpec {
    /// Build from an argument vector. Returns `None` when `argv` is empty.
    #[must_use]
    pub fn new(argv: Vec<String>) -> Option<Self> {
        if argv.is_empty() {
            return None;
        }
        let display = argv.join(" ");
        Some(Self { argv, display })
    }

    /// Program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Arguments after the program name.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    /// Arguments joined with single spaces, for the status header.
    #[must_use]
    pub fn display(&self) -> &str {
        &self.display
    }
}

/// Display state, both frame slots, and the command spec.
#[derive(Debug)]
pub struct WatchContext {
    /// Scroll, interval, pause, and highlight state.
    pub state: DisplayState,
    /// Double-buffered captures.
    pub frames: FramePair,
    /// The watched command.
    pub command: CommandSpec,
}

impl WatchContext {
    /// Create a context with fresh frame slots.
    #[must_use]
    pub fn new(command: CommandSpec, state: DisplayState) -> Self {
        Self {
            state,
            frames: FramePair::new(),
            command,
        }
    }
}
