//! Display state shared by the interpreter, renderer, and scheduler.

use crate::frame::{MAXCOLUMN, MAXLINE};
use std::time::SystemTime;

/// Default refresh interval in seconds.
pub const DEFAULT_INTERVAL: u32 = 2;

/// Diff highlighting granularity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HighlightMode {
    /// Plain output.
    #[default]
    None,
    /// Highlight each differing character.
    Char,
    /// Highlight each word containing a difference.
    Word,
    /// Highlight every line that differs.
    Line,
}

impl HighlightMode {
    /// Lowercase name used in config files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Char => "char",
            Self::Word => "word",
            Self::Line => "line",
        }
    }

    /// Parse a lowercase mode name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "none" | "off" => Some(Self::None),
            "char" | "character" => Some(Self::Char),
            "word" => Some(Self::Word),
            "line" => Some(Self::Line),
            _ => None,
        }
    }
}

/// Scroll position, interval, pause flag, and highlight mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayState {
    line_offset: usize,
    column_offset: usize,
    prefix: u32,
    interval: u32,
    paused: bool,
    highlight_mode: HighlightMode,
    last_highlight_mode: HighlightMode,
    last_update: Option<SystemTime>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            line_offset: 0,
            column_offset: 0,
            prefix: 0,
            interval: DEFAULT_INTERVAL,
            paused: false,
            highlight_mode: HighlightMode::None,
            last_highlight_mode: HighlightMode::Char,
            last_update: None,
        }
    }
}

impl DisplayState {
    /// Create the default state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the refresh interval. Zero is ignored.
    #[must_use]
    pub fn with_interval(mut self, seconds: u32) -> Self {
        self.set_interval(seconds);
        self
    }

    /// Set the initial highlight mode.
    #[must_use]
    pub fn with_highlight_mode(mut self, mode: HighlightMode) -> Self {
        self.highlight_mode = mode;
        self
    }

    /// Start paused or running.
    #[must_use]
    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    /// Set the initial scroll offsets, clamped to buffer capacity.
    #[must_use]
    pub fn with_offsets(mut self, line: usize, column: usize) -> Self {
        self.set_line_offset(line);
        self.set_column_offset(column);
        self
    }

    /// First captured line shown in the viewport.
    #[must_use]
    pub const fn line_offset(&self) -> usize {
        self.line_offset
    }

    /// First display column shown in the viewport.
    #[must_use]
    pub const fn column_offset(&self) -> usize {
        self.column_offset
    }

    /// Pending numeric prefix.
    #[must_use]
    pub const fn prefix(&self) -> u32 {
        self.prefix
    }

    /// Seconds between refreshes.
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Whether timed refreshes are suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Active highlight mode.
    #[must_use]
    pub const fn highlight_mode(&self) -> HighlightMode {
        self.highlight_mode
    }

    /// Mode restored by the next toggle back from `None`.
    #[must_use]
    pub const fn last_highlight_mode(&self) -> HighlightMode {
        self.last_highlight_mode
    }

    /// Completion time of the most recent capture.
    #[must_use]
    pub const fn last_update(&self) -> Option<SystemTime> {
        self.last_update
    }

    /// Record a completed capture.
    pub fn mark_updated(&mut self, at: SystemTime) {
        self.last_update = Some(at);
    }

    pub(crate) fn set_line_offset(&mut self, line: usize) {
        self.line_offset = line.min(MAXLINE - 1);
    }

    pub(crate) fn set_column_offset(&mut self, column: usize) {
        self.column_offset = column.min(MAXCOLUMN - 1);
    }

    pub(crate) fn set_interval(&mut self, seconds: u32) {
        if seconds > 0 {
            self.interval = seconds;
        }
    }

    pub(crate) fn set_prefix(&mut self, prefix: u32) {
        self.prefix = prefix;
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub(crate) fn set_highlight_mode(&mut self, mode: HighlightMode) {
        self.highlight_mode = mode;
    }

    pub(crate) fn set_last_highlight_mode(&mut self, mode: HighlightMode) {
        self.last_highlight_mode = mode;
    }
}
