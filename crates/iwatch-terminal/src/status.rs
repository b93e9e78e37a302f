//! The two header rows above the captured output.

use crate::direct::{CellBuffer, Modifiers};
use chrono::{DateTime, Local, TimeZone};
use iwatch_core::{CommandSpec, DisplayState, HighlightMode};
use std::fmt::Display;

/// Columns reserved at the right of row 1 for the mode legend.
pub const MODE_LEGEND_WIDTH: u16 = 47;

const LEGEND: [(&str, HighlightMode, &str); 3] = [
    (" [w]", HighlightMode::Word, "word"),
    (" [e]", HighlightMode::Line, "line"),
    (" [r]", HighlightMode::Char, "char"),
];

/// Format a timestamp the way `ctime(3)` does, without the newline.
pub fn format_timestamp<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    at.format("%a %b %e %H:%M:%S %Y").to_string()
}

/// Quoted command for row 0, shortened with `..` when it would run into
/// the timestamp.
pub fn command_title(command: &str, cols: u16) -> String {
    let budget = i32::from(cols) - i32::from(MODE_LEGEND_WIDTH);
    let len = i32::try_from(command.chars().count()).unwrap_or(i32::MAX);
    if len > budget {
        let keep = usize::try_from(budget - 2).unwrap_or(0);
        let head: String = command.chars().take(keep).collect();
        format!("\"{head}..\" ")
    } else {
        format!("\"{command}\" ")
    }
}

/// Refresh status for row 0.
pub fn refresh_status(state: &DisplayState) -> String {
    if state.is_paused() {
        "--PAUSE--".to_string()
    } else if state.interval() > 1 {
        format!("on every {} seconds", state.interval())
    } else {
        "on every seconds".to_string()
    }
}

/// Paint both header rows.
pub fn paint_header(buffer: &mut CellBuffer, state: &DisplayState, command: &CommandSpec) {
    let cols = buffer.width();

    let x = buffer.write_str(0, 0, &command_title(command.display(), cols), Modifiers::NONE);
    buffer.write_str(x, 0, &refresh_status(state), Modifiers::NONE);

    if let Some(at) = state.last_update() {
        let stamp = format_timestamp(&DateTime::<Local>::from(at));
        let width = stamp.chars().count() as u16;
        buffer.write_str(cols.saturating_sub(width), 0, &stamp, Modifiers::NONE);
    }

    let mut x = cols.saturating_sub(MODE_LEGEND_WIDTH);
    x = buffer.write_str(x, 1, "Reverse mode:", Modifiers::NONE);
    for (hotkey, mode, name) in LEGEND {
        x = buffer.write_str(x, 1, hotkey, Modifiers::NONE);
        let active = state.highlight_mode() == mode;
        x = buffer.write_str(x, 1, name, Modifiers::standout(active));
    }
    buffer.write_str(x, 1, " [t]toggle", Modifiers::NONE);

    let mut x = 1;
    if state.prefix() > 0 {
        x = buffer.write_str(x, 1, &format!("{} ", state.prefix()), Modifiers::NONE);
    }
    if state.line_offset() != 0 || state.column_offset() != 0 {
        let offsets = format!("({}, {})", state.line_offset(), state.column_offset());
        buffer.write_str(x, 1, &offsets, Modifiers::NONE);
    }
}
