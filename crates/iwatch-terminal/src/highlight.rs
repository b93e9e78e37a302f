//! Frame diff painter.
//!
//! Draws the visible window of the current frame into a [`CellBuffer`],
//! marking what changed since the previous frame with reverse video. Cells
//! are compared at fixed positions; there is no alignment step, so an
//! inserted character highlights everything after it on that line.

use crate::direct::{CellBuffer, Modifiers};
use iwatch_core::{DisplayState, Frame, Glyph, HighlightMode, Line, MAXLINE};

/// First screen row used for captured output; rows above hold the header.
pub const FIRST_ROW: u16 = 2;

/// Paint `current` (diffed against `previous`) from `FIRST_ROW` down.
///
/// Stops at the bottom of the buffer, at the first absent line, or at
/// `MAXLINE`. Without a previous frame nothing is highlighted.
pub fn paint_frame(
    buffer: &mut CellBuffer,
    current: &Frame,
    previous: Option<&Frame>,
    state: &DisplayState,
) {
    let mode = if previous.is_some() {
        state.highlight_mode()
    } else {
        HighlightMode::None
    };

    let mut row = state.line_offset();
    for y in FIRST_ROW..buffer.height() {
        if row >= MAXLINE {
            break;
        }
        let Some(line) = current.line(row) else {
            break;
        };
        let old = previous.and_then(|frame| frame.line(row));
        paint_line(buffer, y, line, old, mode, state.column_offset());
        row += 1;
    }
}

/// Paint one line at screen row `y`.
pub fn paint_line(
    buffer: &mut CellBuffer,
    y: u16,
    line: &Line,
    previous: Option<&Line>,
    mode: HighlightMode,
    column_offset: usize,
) {
    let mut painter = LinePainter::new(buffer, y, line, column_offset);
    match mode {
        HighlightMode::None => painter.plain(false),
        HighlightMode::Line => painter.plain(previous != Some(line)),
        HighlightMode::Char => painter.by_cell(previous, column_offset, false),
        HighlightMode::Word => painter.by_cell(previous, column_offset, true),
    }
}

/// Index of the first glyph at or past `column`, and how far past it lands.
///
/// Positions beyond the end of the line count as one column each.
fn skip_columns(line: &Line, column: usize) -> (usize, usize) {
    let mut idx = 0;
    let mut width = 0;
    while width < column {
        width += line.get(idx).map_or(1, Glyph::width);
        idx += 1;
    }
    (idx, width - column)
}

struct LinePainter<'a> {
    buffer: &'a mut CellBuffer,
    line: &'a Line,
    y: u16,
    cols: usize,
    /// First visible glyph.
    first: usize,
    /// Columns of a wide glyph cut by the left edge.
    overshoot: usize,
}

impl<'a> LinePainter<'a> {
    fn new(buffer: &'a mut CellBuffer, y: u16, line: &'a Line, column_offset: usize) -> Self {
        let cols = usize::from(buffer.width());
        let (first, overshoot) = skip_columns(line, column_offset);
        Self {
            buffer,
            line,
            y,
            cols,
            first,
            overshoot,
        }
    }

    /// Whether a glyph of `width` may be drawn at `x`. The last column stays
    /// empty so a wide glyph never straddles the edge.
    fn fits(&self, x: usize, width: usize) -> bool {
        x + width < self.cols
    }

    fn put(&mut self, x: usize, glyph: Glyph, modifiers: Modifiers) {
        self.buffer.put(x as u16, self.y, glyph.ch(), modifiers);
    }

    /// Unhighlighted output, or a fully highlighted row when `changed`.
    fn plain(&mut self, changed: bool) {
        let style = Modifiers::standout(changed);
        if changed {
            for x in 0..self.overshoot.min(self.cols) {
                self.put(x, Glyph::SPACE, style);
            }
        }

        let mut x = self.overshoot;
        let mut p = self.first;
        while x < self.cols {
            if let Some(glyph) = self.line.get(p) {
                if !self.fits(x, glyph.width()) {
                    break;
                }
                self.put(x, glyph, style);
                p += 1;
                x += glyph.width();
            } else if changed {
                self.put(x, Glyph::SPACE, style);
                x += 1;
            } else {
                break;
            }
        }
    }

    /// Char and word modes: walk both lines in lockstep and highlight each
    /// differing glyph, or the whole word around it.
    fn by_cell(&mut self, previous: Option<&Line>, column_offset: usize, word: bool) {
        let old = |pp: usize| previous.and_then(|line| line.get(pp)).map(Glyph::ch);
        let mut p = self.first;
        let mut pp = previous.map_or(0, |line| skip_columns(line, column_offset).0);
        let mut x = self.overshoot;

        while let Some(glyph) = self.line.get(p) {
            if !self.fits(x, glyph.width()) {
                break;
            }
            if old(pp) == Some(glyph.ch()) {
                self.put(x, glyph, Modifiers::NONE);
                p += 1;
                pp += 1;
                x += glyph.width();
                continue;
            }

            // Back up to the start of the word; its head was already drawn
            // plain and gets repainted below. Quadratic on long words.
            if word && !glyph.is_space() {
                while p > self.first && self.line.get(p - 1).is_some_and(|g| !g.is_space()) {
                    p -= 1;
                    pp = pp.saturating_sub(1);
                    x -= self.line.get(p).map_or(1, Glyph::width);
                }
            }

            let Some(glyph) = self.line.get(p) else {
                break;
            };
            self.put(x, glyph, Modifiers::REVERSE);
            p += 1;
            pp += 1;
            x += glyph.width();

            if word {
                while let Some(next) = self.line.get(p) {
                    if next.is_space() || !self.fits(x, next.width()) {
                        break;
                    }
                    self.put(x, next, Modifiers::REVERSE);
                    p += 1;
                    pp += 1;
                    x += next.width();
                }
            }
        }
    }
}
