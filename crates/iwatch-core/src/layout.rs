//! Text layout: raw command output to fixed-width display glyphs.

use crate::frame::{Glyph, Line, MAXCOLUMN, TABSTOP};
use unicode_width::UnicodeWidthChar;

/// Placeholder drawn in place of control and zero-width characters.
pub const CONTROL_PLACEHOLDER: char = '?';

/// Expand tabs in place so the glyph after each tab starts on the next
/// multiple of [`TABSTOP`] display columns.
///
/// At most `capacity - 1` glyphs remain afterwards; the last slot is the
/// sentinel. When a tab's shift would run past that boundary the shifted
/// tail is discarded and only the spaces that fit are written.
pub fn expand_tabs(glyphs: &mut Vec<Glyph>, capacity: usize) {
    let limit = capacity.saturating_sub(1);
    let mut width = 0;
    let mut idx = 0;

    while idx < glyphs.len() && idx < limit {
        let glyph = glyphs[idx];
        if !glyph.is_tab() {
            width += glyph.width();
            idx += 1;
            continue;
        }

        let spaces = TABSTOP - width % TABSTOP;
        glyphs.splice(idx..=idx, std::iter::repeat(Glyph::SPACE).take(spaces));
        glyphs.truncate(limit);

        let written = spaces.min(limit - idx);
        idx += written;
        width += written;
    }

    glyphs.truncate(idx);
}

/// Lay out one raw output line.
///
/// Strips the line terminator, replaces control characters other than tab
/// and zero-width characters (combining marks, joiners) with
/// [`CONTROL_PLACEHOLDER`], keeps at most [`MAXCOLUMN`] characters and
/// expands tabs.
#[must_use]
pub fn layout_line(raw: &str) -> Line {
    let trimmed = raw
        .strip_suffix('\n')
        .map_or(raw, |s| s.strip_suffix('\r').unwrap_or(s));

    let text: String = trimmed
        .chars()
        .take(MAXCOLUMN)
        .map(|ch| {
            if ch != '\t' && (ch.is_control() || ch.width() == Some(0)) {
                CONTROL_PLACEHOLDER
            } else {
                ch
            }
        })
        .collect();

    Line::from_text(&text)
}
