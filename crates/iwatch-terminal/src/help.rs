//! Help overlay.

use crate::direct::{CellBuffer, Modifiers};

/// Help text, one entry per row inside the box.
pub const HELP_LINES: [&str; 21] = [
    " Scroll:                                         ",
    "            1-char    half-win  full-win  8-char ",
    "   UP       k, -      u, ^u     b, ^b            ",
    "   DOWN     j, RET    d, ^d     f, ^f            ",
    "   RIGHT    l         L         >         ]      ",
    "   LEFT     h         H         <         [      ",
    "                                                 ",
    "   g        goto top or prefix number line       ",
    "                                                 ",
    " Others:                                         ",
    "   space    update buffer                        ",
    "   ctrl-l   refresh screen                       ",
    "   0..9     prefix number argument               ",
    "   r        reverse character                    ",
    "   e        reverse entire line                  ",
    "   w        reverse word                         ",
    "   t        toggle reverse mode                  ",
    "   i        set interval for prefix number       ",
    "   p        pause and restart                    ",
    "   ?        show this message                    ",
    "   q        quit                                 ",
];

/// Prompt drawn on the bottom border.
pub const CONTINUE_PROMPT: &str = " Hit any key to continue ";

fn text_width() -> usize {
    HELP_LINES.iter().map(|l| l.len()).max().unwrap_or(0)
}

/// Top-left corner of the help box, or `None` when the box does not fit.
pub fn help_origin(cols: u16, rows: u16) -> Option<(u16, u16)> {
    let box_width = text_width() + 2;
    let box_height = HELP_LINES.len() + 2;

    let x = (i64::from(cols) - box_width as i64 + 1) / 2;
    let y = (i64::from(rows) - box_height as i64 + 1) / 2;
    if x < 0 || y < 0 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    if x + box_width > usize::from(cols) || y + box_height > usize::from(rows) {
        return None;
    }
    Some((x as u16, y as u16))
}

/// Draw the help box over whatever is in `buffer`.
///
/// Returns `false`, drawing nothing, when the terminal is too small.
pub fn paint_help(buffer: &mut CellBuffer) -> bool {
    let Some((x0, y0)) = help_origin(buffer.width(), buffer.height()) else {
        return false;
    };

    let inner = text_width() as u16;
    let right = x0 + inner + 1;
    let bottom = y0 + HELP_LINES.len() as u16 + 1;

    for y in y0..=bottom {
        for x in x0..=right {
            let ch = match (x == x0 || x == right, y == y0 || y == bottom) {
                (true, true) => '+',
                (true, false) => '|',
                (false, true) => '-',
                (false, false) => ' ',
            };
            buffer.put(x, y, ch, Modifiers::NONE);
        }
    }

    for (i, line) in HELP_LINES.iter().enumerate() {
        buffer.write_str(x0 + 1, y0 + 1 + i as u16, line, Modifiers::NONE);
    }

    let prompt_x = x0 + inner + 1 - CONTINUE_PROMPT.len() as u16;
    buffer.write_str(prompt_x, bottom, CONTINUE_PROMPT, Modifiers::REVERSE);
    true
}
