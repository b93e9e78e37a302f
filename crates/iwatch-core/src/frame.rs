//! Fixed-capacity snapshot storage.
//!
//! A [`Frame`] holds one captured run of the watched command: at most
//! [`MAXLINE`] lines of at most `LINE_CAPACITY - 1` glyphs each. Rows past
//! [`Frame::len`] are absent, which is how rendering and diffing find the end
//! of the content.

use crate::layout;
use unicode_width::UnicodeWidthChar;

/// Maximum number of captured lines per frame.
pub const MAXLINE: usize = 300;
/// Maximum number of display glyphs per captured line.
pub const MAXCOLUMN: usize = 180;
/// Slots per line including the terminating sentinel slot.
pub const LINE_CAPACITY: usize = MAXCOLUMN + 1;
/// Tab stop used when expanding tabs.
pub const TABSTOP: usize = 8;

/// Display width of a character in terminal columns.
///
/// Zero-width and non-printable characters count as one column so that
/// every glyph always advances the cursor.
#[must_use]
pub fn display_width(ch: char) -> usize {
    match UnicodeWidthChar::width(ch) {
        Some(w) if w > 0 => w,
        _ => 1,
    }
}

/// One printable character together with its display width.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glyph {
    ch: char,
    width: u8,
}

impl Glyph {
    /// A single ASCII space.
    pub const SPACE: Self = Self { ch: ' ', width: 1 };

    /// Create a glyph, looking up its display width.
    #[must_use]
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            width: display_width(ch).min(2) as u8,
        }
    }

    /// The character.
    #[must_use]
    pub const fn ch(self) -> char {
        self.ch
    }

    /// Columns occupied on screen (1 or 2).
    #[must_use]
    pub const fn width(self) -> usize {
        self.width as usize
    }

    /// Whether this glyph separates words.
    #[must_use]
    pub fn is_space(self) -> bool {
        self.ch.is_whitespace()
    }

    /// Whether this glyph is a horizontal tab.
    #[must_use]
    pub const fn is_tab(self) -> bool {
        self.ch == '\t'
    }
}

impl From<char> for Glyph {
    fn from(ch: char) -> Self {
        Self::new(ch)
    }
}

/// One captured line, already tab-expanded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    glyphs: Vec<Glyph>,
}

impl Line {
    /// Create an empty line.
    #[must_use]
    pub const fn new() -> Self {
        Self { glyphs: Vec::new() }
    }

    /// Build a line from raw text, expanding tabs within [`LINE_CAPACITY`].
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut glyphs: Vec<Glyph> = text.chars().map(Glyph::new).collect();
        layout::expand_tabs(&mut glyphs, LINE_CAPACITY);
        Self { glyphs }
    }

    /// Glyphs of this line.
    #[must_use]
    pub fn glyphs(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// Glyph at `idx`, or `None` at and past the sentinel.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Glyph> {
        self.glyphs.get(idx).copied()
    }

    /// Number of glyphs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether the line holds no glyphs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Total display width of the line.
    #[must_use]
    pub fn width(&self) -> usize {
        self.glyphs.iter().map(|g| g.width()).sum()
    }

    /// The line as a string.
    #[must_use]
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch()).collect()
    }
}

/// One complete captured snapshot.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    lines: Vec<Line>,
}

impl Frame {
    /// Create an empty frame with room for [`MAXLINE`] lines.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: Vec::with_capacity(MAXLINE),
        }
    }

    /// Reset to all-empty, keeping the allocation.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Append a line. Returns `false` once the frame is full.
    pub fn push(&mut self, line: Line) -> bool {
        if self.is_full() {
            return false;
        }
        self.lines.push(line);
        true
    }

    /// Whether [`MAXLINE`] lines are stored.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.lines.len() >= MAXLINE
    }

    /// Line at `row`, or `None` if the row is past the end of content.
    #[must_use]
    pub fn line(&self, row: usize) -> Option<&Line> {
        self.lines.get(row)
    }

    /// Number of present lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no lines are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Two frame slots allocated once and alternated between refreshes.
#[derive(Debug)]
pub struct FramePair {
    slots: [Frame; 2],
    current: usize,
    refreshes: u64,
}

impl Default for FramePair {
    fn default() -> Self {
        Self::new()
    }
}

impl FramePair {
    /// Allocate both slots.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: [Frame::new(), Frame::new()],
            current: 0,
            refreshes: 0,
        }
    }

    /// Start a new refresh: flip slots and return the cleared current slot.
    ///
    /// The very first call keeps slot 0 so that no previous frame exists.
    pub fn advance(&mut self) -> &mut Frame {
        if self.refreshes > 0 {
            self.current ^= 1;
        }
        self.refreshes += 1;
        let frame = &mut self.slots[self.current];
        frame.clear();
        frame
    }

    /// Frame filled by the latest refresh.
    #[must_use]
    pub fn current(&self) -> &Frame {
        &self.slots[self.current]
    }

    /// Frame filled by the refresh before the latest, if any.
    #[must_use]
    pub fn previous(&self) -> Option<&Frame> {
        if self.refreshes > 1 {
            Some(&self.slots[self.current ^ 1])
        } else {
            None
        }
    }

    /// Number of refreshes started so far.
    #[must_use]
    pub const fn refreshes(&self) -> u64 {
        self.refreshes
    }
}
