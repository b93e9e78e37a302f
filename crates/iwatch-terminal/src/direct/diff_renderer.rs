//! Differential renderer for optimized terminal I/O.
//!
//! Minimizes terminal escape sequences and syscalls by:
//! - Only rendering dirty cells that differ from what is already on screen
//! - Batching output to a buffer
//! - Skipping redundant cursor moves
//! - Caching current attribute state

use super::cell_buffer::{Cell, CellBuffer, Modifiers};
use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Print, SetAttribute};
use crossterm::{queue, QueueableCommand};
use std::io::{self, BufWriter, Write};
use unicode_width::UnicodeWidthStr;

/// Differential renderer that minimizes terminal I/O.
///
/// Tracks the current cursor position, attribute state, and a shadow copy of
/// the cells last written so that repainting an unchanged screen is free.
#[derive(Debug)]
pub struct DiffRenderer {
    /// Cells as last flushed; `None` means unknown.
    shadow: Vec<Option<Cell>>,
    /// Last known cursor position (`u16::MAX` = unknown).
    cursor_x: u16,
    cursor_y: u16,
    /// Last known attribute state.
    last_style: Modifiers,
    /// Statistics: number of cells written.
    cells_written: usize,
    /// Statistics: number of cursor moves.
    cursor_moves: usize,
    /// Statistics: number of style changes.
    style_changes: usize,
}

impl Default for DiffRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffRenderer {
    /// Create a new renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shadow: Vec::new(),
            cursor_x: u16::MAX,
            cursor_y: u16::MAX,
            last_style: Modifiers::NONE,
            cells_written: 0,
            cursor_moves: 0,
            style_changes: 0,
        }
    }

    /// Reset renderer state (call after terminal resize or clear).
    ///
    /// Forgets everything known about the screen, so the next flush writes
    /// every dirty cell.
    pub fn reset(&mut self) {
        self.shadow.clear();
        self.cursor_x = u16::MAX;
        self.cursor_y = u16::MAX;
        self.last_style = Modifiers::NONE;
        self.cells_written = 0;
        self.cursor_moves = 0;
        self.style_changes = 0;
    }

    /// Get cells written in last flush.
    #[must_use]
    pub const fn cells_written(&self) -> usize {
        self.cells_written
    }

    /// Get cursor moves in last flush.
    #[must_use]
    pub const fn cursor_moves(&self) -> usize {
        self.cursor_moves
    }

    /// Get style changes in last flush.
    #[must_use]
    pub const fn style_changes(&self) -> usize {
        self.style_changes
    }

    /// Flush dirty cells to the writer.
    ///
    /// Returns the number of cells written.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the writer fails.
    pub fn flush<W: Write>(
        &mut self,
        buffer: &mut CellBuffer,
        writer: &mut W,
    ) -> io::Result<usize> {
        self.cells_written = 0;
        self.cursor_moves = 0;
        self.style_changes = 0;

        if buffer.is_empty() {
            buffer.clear_dirty();
            return Ok(0);
        }

        if self.shadow.len() != buffer.len() {
            self.shadow.clear();
            self.shadow.resize(buffer.len(), None);
        }

        // Use buffered writer to batch syscalls
        let mut buf_writer = BufWriter::with_capacity(8192, writer);

        queue!(buf_writer, SetAttribute(Attribute::Reset))?;
        self.last_style = Modifiers::NONE;

        let width = buffer.width();

        for idx in buffer.iter_dirty() {
            let cell = &buffer.cells()[idx];

            if self.shadow[idx].as_ref() == Some(cell) {
                continue;
            }

            // Continuation cells are drawn by their lead glyph
            if cell.is_continuation() {
                self.shadow[idx] = Some(cell.clone());
                continue;
            }

            let (x, y) = buffer.coords(idx);
            if self.cursor_x != x || self.cursor_y != y {
                queue!(buf_writer, MoveTo(x, y))?;
                self.cursor_x = x;
                self.cursor_y = y;
                self.cursor_moves += 1;
            }

            if cell.modifiers != self.last_style {
                apply_style(&mut buf_writer, cell.modifiers)?;
                self.last_style = cell.modifiers;
                self.style_changes += 1;
            }

            queue!(buf_writer, Print(&cell.symbol))?;

            // A symbol the terminal draws narrower than its cell (a lone
            // combining mark) leaves the cursor somewhere we can't predict.
            let advance = u16::from(cell.width());
            self.cursor_x = if cell.symbol.as_str().width() == usize::from(advance) {
                self.cursor_x.saturating_add(advance)
            } else {
                u16::MAX
            };
            if self.cursor_x >= width {
                self.cursor_x = u16::MAX; // Unknown after wrap
            }

            self.shadow[idx] = Some(cell.clone());
            self.cells_written += 1;
        }

        if !self.last_style.is_empty() {
            queue!(buf_writer, SetAttribute(Attribute::Reset))?;
            self.last_style = Modifiers::NONE;
        }

        buffer.clear_dirty();
        buf_writer.flush()?;

        Ok(self.cells_written)
    }

    /// Render a full frame (marks all dirty, forgets the shadow, then flushes).
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn render_full<W: Write>(
        &mut self,
        buffer: &mut CellBuffer,
        writer: &mut W,
    ) -> io::Result<usize> {
        self.reset();
        buffer.mark_all_dirty();
        self.flush(buffer, writer)
    }
}

/// Apply attribute changes to the writer.
fn apply_style<W: Write>(writer: &mut W, style: Modifiers) -> io::Result<()> {
    writer.queue(SetAttribute(Attribute::Reset))?;

    if style.contains(Modifiers::REVERSE) {
        writer.queue(SetAttribute(Attribute::Reverse))?;
    }

    Ok(())
}
