//! Screen-sized cell grid with dirty tracking.
//!
//! Uses `CompactString` to inline glyph symbols, avoiding heap allocations
//! for terminal content.

use bitvec::prelude::*;
use compact_str::CompactString;
use iwatch_core::display_width;

/// Text attributes for terminal cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers(u8);

impl Modifiers {
    /// No attributes.
    pub const NONE: Self = Self(0);
    /// Reverse video (standout), used for highlighting.
    pub const REVERSE: Self = Self(1);

    /// Check if modifiers is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if a specific modifier is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Reverse video when `on`, none otherwise.
    #[must_use]
    pub const fn standout(on: bool) -> Self {
        if on {
            Self::REVERSE
        } else {
            Self::NONE
        }
    }
}

/// A single terminal cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    /// The symbol displayed in this cell.
    pub symbol: CompactString,
    /// Text attributes.
    pub modifiers: Modifiers,
    /// Display width of the symbol (1 for normal, 2 for wide chars, 0 for continuation).
    width: u8,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            symbol: CompactString::const_new(" "),
            modifiers: Modifiers::NONE,
            width: 1,
        }
    }
}

impl Cell {
    /// Create a cell holding one character.
    #[must_use]
    pub fn new(ch: char, modifiers: Modifiers) -> Self {
        let mut buf = [0u8; 4];
        Self {
            symbol: CompactString::new(ch.encode_utf8(&mut buf)),
            modifiers,
            width: display_width(ch).min(2) as u8,
        }
    }

    /// Update the cell content in place.
    pub fn update(&mut self, ch: char, modifiers: Modifiers) {
        self.symbol.clear();
        self.symbol.push(ch);
        self.modifiers = modifiers;
        self.width = display_width(ch).min(2) as u8;
    }

    /// Mark this cell as the right half of a wide character.
    pub fn make_continuation(&mut self, modifiers: Modifiers) {
        self.symbol.clear();
        self.modifiers = modifiers;
        self.width = 0;
    }

    /// Check if this is a continuation cell.
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }

    /// Get the display width of this cell.
    #[must_use]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Reset to a plain blank.
    pub fn reset(&mut self) {
        self.symbol.clear();
        self.symbol.push(' ');
        self.modifiers = Modifiers::NONE;
        self.width = 1;
    }
}

/// Buffer of terminal cells with dirty tracking.
#[derive(Debug)]
pub struct CellBuffer {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
    /// Dirty bit per cell (1 bit per cell).
    dirty: BitVec,
}

impl CellBuffer {
    /// Create a new buffer with the given dimensions.
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        let size = (width as usize) * (height as usize);
        Self {
            cells: vec![Cell::default(); size],
            width,
            height,
            dirty: bitvec![0; size],
        }
    }

    /// Get the buffer width.
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Get the buffer height.
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Get total cell count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert (x, y) to linear index.
    #[must_use]
    pub fn index(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Convert linear index to (x, y).
    #[must_use]
    pub fn coords(&self, idx: usize) -> (u16, u16) {
        let x = (idx % (self.width as usize)) as u16;
        let y = (idx / (self.width as usize)) as u16;
        (x, y)
    }

    /// Get a cell reference.
    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        if x < self.width && y < self.height {
            Some(&self.cells[self.index(x, y)])
        } else {
            None
        }
    }

    /// Mark all cells as dirty (for full redraw).
    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    /// Clear dirty flags.
    pub fn clear_dirty(&mut self) {
        self.dirty.fill(false);
    }

    /// Count dirty cells.
    #[must_use]
    pub fn dirty_count(&self) -> usize {
        self.dirty.count_ones()
    }

    /// Iterate over dirty cell indices.
    pub fn iter_dirty(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty.iter_ones()
    }

    /// Get cells slice.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Resize the buffer (clears all content).
    pub fn resize(&mut self, width: u16, height: u16) {
        let size = (width as usize) * (height as usize);
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells.resize(size, Cell::default());
        self.dirty = bitvec![0; size];
        self.mark_all_dirty();
    }

    /// Clear the buffer (reset all cells to blank).
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
        self.mark_all_dirty();
    }

    /// Draw one character at (x, y) and return the column after it.
    ///
    /// A glyph that does not fit entirely inside the row is not drawn and
    /// `x` is returned unchanged. Wide glyphs claim the following cell as a
    /// continuation.
    pub fn put(&mut self, x: u16, y: u16, ch: char, modifiers: Modifiers) -> u16 {
        let width = display_width(ch).min(2) as u16;
        if y >= self.height || x.saturating_add(width) > self.width {
            return x;
        }

        self.detach_wide_neighbors(x, y, width);

        let idx = self.index(x, y);
        self.cells[idx].update(ch, modifiers);
        self.dirty.set(idx, true);
        if width == 2 {
            self.cells[idx + 1].make_continuation(modifiers);
            self.dirty.set(idx + 1, true);
        }
        x + width
    }

    /// Write a string starting at (x, y), stopping at the first glyph that
    /// does not fit. Returns the column after the last glyph drawn.
    pub fn write_str(&mut self, x: u16, y: u16, s: &str, modifiers: Modifiers) -> u16 {
        let mut cx = x;
        for ch in s.chars() {
            let next = self.put(cx, y, ch, modifiers);
            if next == cx {
                break;
            }
            cx = next;
        }
        cx
    }

    /// Text of one row, with continuation cells skipped.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = self.index(0, y);
        self.cells[start..start + self.width as usize]
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.symbol.as_str())
            .collect()
    }

    /// Columns of row `y` that carry reverse video.
    #[must_use]
    pub fn reversed_columns(&self, y: u16) -> Vec<u16> {
        (0..self.width)
            .filter(|&x| {
                self.get(x, y)
                    .is_some_and(|c| c.modifiers.contains(Modifiers::REVERSE))
            })
            .collect()
    }

    /// Blank the other half of any wide glyph that the write at
    /// `x..x + width` would cut in two.
    fn detach_wide_neighbors(&mut self, x: u16, y: u16, width: u16) {
        if x > 0 && self.get(x, y).is_some_and(Cell::is_continuation) {
            let left = self.index(x - 1, y);
            self.cells[left].reset();
            self.dirty.set(left, true);
        }
        let last = x + width - 1;
        if last + 1 < self.width && self.get(last, y).is_some_and(|c| c.width() == 2) {
            let right = self.index(last + 1, y);
            self.cells[right].reset();
            self.dirty.set(right, true);
        }
    }
}
