//! Keyboard command interpreter.
//!
//! Every keystroke maps to a mutation of [`DisplayState`] plus a
//! [`KbdResult`] telling the scheduler what to do next. The interpreter has
//! no hidden state of its own: the numeric prefix lives in the display state.

use crate::frame::MAXLINE;
use crate::state::{DisplayState, HighlightMode};

/// Columns moved by `]`, `[`, Tab, and Backspace.
pub const COLUMN_STEP: usize = 8;

/// A single keystroke, independent of the terminal library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// A character typed with Control held.
    Ctrl(char),
    /// Return / Enter.
    Enter,
    /// Escape.
    Esc,
    /// Horizontal tab.
    Tab,
    /// Backspace.
    Backspace,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
    /// A bare modifier key press (Shift, Control, ...).
    Modifier,
    /// Anything without a binding.
    Unknown,
}

/// What the scheduler should do after a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KbdResult {
    /// Run the command again now.
    Update,
    /// Re-render with the current frame pair.
    Redraw,
    /// Keep waiting without re-rendering.
    NoTouch,
    /// Unrecognized key: ring the bell and keep waiting.
    Error,
    /// Show the help overlay, then re-render.
    Help,
    /// Repaint the whole screen from scratch, then re-render.
    Clear,
    /// Tear down the terminal and exit.
    Quit,
}

/// Terminal geometry used for page-sized motions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    /// Terminal rows.
    pub rows: u16,
    /// Terminal columns.
    pub cols: u16,
}

impl Viewport {
    /// Create a viewport.
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { rows, cols }
    }

    fn page_rows(self) -> usize {
        usize::from(self.rows).saturating_sub(2)
    }

    fn page_cols(self) -> usize {
        usize::from(self.cols).saturating_sub(2)
    }
}

enum Motion {
    Down(usize),
    Up(usize),
    Right(usize),
    Left(usize),
}

impl DisplayState {
    /// Apply one keystroke.
    pub fn interpret(&mut self, key: Key, viewport: Viewport) -> KbdResult {
        let result = match key {
            Key::Char(d @ '0'..='9') => {
                let digit = d.to_digit(10).unwrap_or(0);
                let prefix = self.prefix().saturating_mul(10).saturating_add(digit);
                self.set_prefix(prefix);
                return KbdResult::Redraw;
            }
            Key::Esc => {
                self.set_prefix(0);
                return KbdResult::Redraw;
            }
            Key::Modifier => return KbdResult::NoTouch,

            Key::Char(' ') => KbdResult::Update,
            Key::Char('p') => {
                let paused = !self.is_paused();
                self.set_paused(paused);
                if paused {
                    KbdResult::Redraw
                } else {
                    KbdResult::Update
                }
            }

            Key::Char('t') => {
                self.toggle_highlight();
                KbdResult::Redraw
            }
            Key::Char('r') => self.switch_highlight(HighlightMode::Char),
            Key::Char('w') => self.switch_highlight(HighlightMode::Word),
            Key::Char('e') => self.switch_highlight(HighlightMode::Line),

            Key::Char('i') => {
                if self.prefix() > 0 {
                    self.set_interval(self.prefix());
                }
                KbdResult::Redraw
            }

            Key::Char('j' | '+') | Key::Enter | Key::Down => self.scroll(Motion::Down(1)),
            Key::Char('k' | '-') | Key::Up => self.scroll(Motion::Up(1)),
            Key::Char('d' | 'D') | Key::Ctrl('d') => {
                self.scroll(Motion::Down(viewport.page_rows() / 2))
            }
            Key::Char('u' | 'U') | Key::Ctrl('u') => {
                self.scroll(Motion::Up(viewport.page_rows() / 2))
            }
            Key::Char('f') | Key::Ctrl('f') | Key::PageDown => {
                self.scroll(Motion::Down(viewport.page_rows()))
            }
            Key::Char('b') | Key::Ctrl('b') | Key::PageUp => {
                self.scroll(Motion::Up(viewport.page_rows()))
            }
            Key::Char('g') => {
                let target = self.prefix() as usize;
                if target < MAXLINE {
                    self.set_line_offset(target);
                }
                KbdResult::Redraw
            }

            Key::Char('l') | Key::Right => self.scroll(Motion::Right(1)),
            Key::Char('h') | Key::Left => self.scroll(Motion::Left(1)),
            Key::Char('L') => self.scroll(Motion::Right(viewport.page_cols() / 2)),
            Key::Char('H') => self.scroll(Motion::Left(viewport.page_cols() / 2)),
            Key::Char(']') | Key::Tab => self.scroll(Motion::Right(COLUMN_STEP)),
            Key::Char('[') | Key::Backspace => self.scroll(Motion::Left(COLUMN_STEP)),
            Key::Char('>') => self.scroll(Motion::Right(viewport.page_cols())),
            Key::Char('<') => self.scroll(Motion::Left(viewport.page_cols())),
            Key::Char('{') => {
                self.set_column_offset(0);
                KbdResult::Redraw
            }

            Key::Char('?') => KbdResult::Help,
            Key::Ctrl('l') => KbdResult::Clear,
            Key::Char('q' | 'Q') | Key::Ctrl('c') => KbdResult::Quit,

            _ => return KbdResult::Error,
        };

        self.set_prefix(0);
        result
    }

    fn scroll(&mut self, motion: Motion) -> KbdResult {
        match motion {
            Motion::Down(n) => self.set_line_offset(self.line_offset().saturating_add(n)),
            Motion::Up(n) => self.set_line_offset(self.line_offset().saturating_sub(n)),
            Motion::Right(n) => self.set_column_offset(self.column_offset().saturating_add(n)),
            Motion::Left(n) => self.set_column_offset(self.column_offset().saturating_sub(n)),
        }
        KbdResult::Redraw
    }

    fn toggle_highlight(&mut self) {
        let mode = self.highlight_mode();
        if mode == HighlightMode::None {
            self.set_highlight_mode(self.last_highlight_mode());
        } else {
            self.set_last_highlight_mode(mode);
            self.set_highlight_mode(HighlightMode::None);
        }
    }

    fn switch_highlight(&mut self, mode: HighlightMode) -> KbdResult {
        if self.highlight_mode() == mode {
            self.set_highlight_mode(HighlightMode::None);
        } else {
            self.set_highlight_mode(mode);
        }
        KbdResult::Redraw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::MAXCOLUMN;
    use proptest::prelude::*;

    const VIEW: Viewport = Viewport::new(80, 24);

    fn press(state: &mut DisplayState, keys: &[Key]) -> Vec<KbdResult> {
        keys.iter().map(|k| state.interpret(*k, VIEW)).collect()
    }

    #[test]
    fn test_digits_accumulate_prefix() {
        let mut state = DisplayState::new();
        let results = press(&mut state, &[Key::Char('4'), Key::Char('2')]);
        assert_eq!(results, vec![KbdResult::Redraw, KbdResult::Redraw]);
        assert_eq!(state.prefix(), 42);
    }

    #[test]
    fn test_prefix_saturates() {
        let mut state = DisplayState::new();
        for _ in 0..20 {
            state.interpret(Key::Char('9'), VIEW);
        }
        assert_eq!(state.prefix(), u32::MAX);
    }

    #[test]
    fn test_escape_clears_prefix() {
        let mut state = DisplayState::new();
        press(&mut state, &[Key::Char('7')]);
        assert_eq!(state.interpret(Key::Esc, VIEW), KbdResult::Redraw);
        assert_eq!(state.prefix(), 0);
    }

    #[test]
    fn test_prefix_then_g_jumps() {
        let mut state = DisplayState::new();
        press(&mut state, &[Key::Char('5'), Key::Char('g')]);
        assert_eq!(state.line_offset(), 5);
        assert_eq!(state.prefix(), 0);
    }

    #[test]
    fn test_g_without_prefix_goes_to_top() {
        let mut state = DisplayState::new().with_offsets(40, 0);
        assert_eq!(state.interpret(Key::Char('g'), VIEW), KbdResult::Redraw);
        assert_eq!(state.line_offset(), 0);
    }

    #[test]
    fn test_g_out_of_range_ignored() {
        let mut state = DisplayState::new().with_offsets(3, 0);
        press(&mut state, &[Key::Char('9'), Key::Char('9'), Key::Char('9')]);
        state.interpret(Key::Char('g'), VIEW);
        assert_eq!(state.line_offset(), 3);
        assert_eq!(state.prefix(), 0);
    }

    #[test]
    fn test_interval_from_prefix() {
        let mut state = DisplayState::new();
        let results = press(&mut state, &[Key::Char('1'), Key::Char('0'), Key::Char('i')]);
        assert_eq!(results.last(), Some(&KbdResult::Redraw));
        assert_eq!(state.interval(), 10);
        assert_eq!(state.prefix(), 0);
    }

    #[test]
    fn test_interval_without_prefix_unchanged() {
        let mut state = DisplayState::new().with_interval(3);
        assert_eq!(state.interpret(Key::Char('i'), VIEW), KbdResult::Redraw);
        assert_eq!(state.interval(), 3);
    }

    #[test]
    fn test_pause_toggle() {
        let mut state = DisplayState::new();
        assert_eq!(state.interpret(Key::Char('p'), VIEW), KbdResult::Redraw);
        assert!(state.is_paused());
        assert_eq!(state.interpret(Key::Char('p'), VIEW), KbdResult::Update);
        assert!(!state.is_paused());
    }

    #[test]
    fn test_space_updates_and_resets_prefix() {
        let mut state = DisplayState::new();
        press(&mut state, &[Key::Char('3')]);
        assert_eq!(state.interpret(Key::Char(' '), VIEW), KbdResult::Update);
        assert_eq!(state.prefix(), 0);
    }

    #[test]
    fn test_mode_exclusivity() {
        let mut state = DisplayState::new();
        state.interpret(Key::Char('r'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::Char);
        state.interpret(Key::Char('w'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::Word);
        state.interpret(Key::Char('w'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::None);
        state.interpret(Key::Char('e'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::Line);
        state.interpret(Key::Char('e'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::None);
    }

    #[test]
    fn test_toggle_restores_last_mode() {
        let mut state = DisplayState::new().with_highlight_mode(HighlightMode::Word);
        state.interpret(Key::Char('t'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::None);
        assert_eq!(state.last_highlight_mode(), HighlightMode::Word);
        state.interpret(Key::Char('t'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::Word);
    }

    #[test]
    fn test_toggle_from_none_uses_char_by_default() {
        let mut state = DisplayState::new();
        state.interpret(Key::Char('t'), VIEW);
        assert_eq!(state.highlight_mode(), HighlightMode::Char);
    }

    #[test]
    fn test_vertical_motion() {
        let mut state = DisplayState::new();
        press(&mut state, &[Key::Char('j'), Key::Enter, Key::Char('+')]);
        assert_eq!(state.line_offset(), 3);
        press(&mut state, &[Key::Char('k'), Key::Char('-')]);
        assert_eq!(state.line_offset(), 1);
        press(&mut state, &[Key::Char('k'), Key::Char('k')]);
        assert_eq!(state.line_offset(), 0);
    }

    #[test]
    fn test_page_motion_uses_viewport() {
        let mut state = DisplayState::new();
        state.interpret(Key::Char('f'), VIEW);
        assert_eq!(state.line_offset(), 22);
        state.interpret(Key::Char('u'), VIEW);
        assert_eq!(state.line_offset(), 11);
        state.interpret(Key::Ctrl('d'), VIEW);
        assert_eq!(state.line_offset(), 22);
        state.interpret(Key::PageUp, VIEW);
        assert_eq!(state.line_offset(), 0);
    }

    #[test]
    fn test_horizontal_motion() {
        let mut state = DisplayState::new();
        state.interpret(Key::Char(']'), VIEW);
        assert_eq!(state.column_offset(), 8);
        state.interpret(Key::Tab, VIEW);
        assert_eq!(state.column_offset(), 16);
        state.interpret(Key::Char('h'), VIEW);
        assert_eq!(state.column_offset(), 15);
        state.interpret(Key::Char('L'), VIEW);
        assert_eq!(state.column_offset(), 54);
        state.interpret(Key::Char('<'), VIEW);
        assert_eq!(state.column_offset(), 0);
        state.interpret(Key::Char('>'), VIEW);
        assert_eq!(state.column_offset(), 78);
        state.interpret(Key::Char('{'), VIEW);
        assert_eq!(state.column_offset(), 0);
    }

    #[test]
    fn test_unknown_key_is_error_and_keeps_state() {
        let mut state = DisplayState::new();
        press(&mut state, &[Key::Char('4')]);
        let before = state.clone();
        assert_eq!(state.interpret(Key::Char('z'), VIEW), KbdResult::Error);
        assert_eq!(state.interpret(Key::Unknown, VIEW), KbdResult::Error);
        assert_eq!(state, before);
    }

    #[test]
    fn test_modifier_is_no_touch() {
        let mut state = DisplayState::new();
        press(&mut state, &[Key::Char('4')]);
        assert_eq!(state.interpret(Key::Modifier, VIEW), KbdResult::NoTouch);
        assert_eq!(state.prefix(), 4);
    }

    #[test]
    fn test_side_effect_results() {
        let mut state = DisplayState::new();
        assert_eq!(state.interpret(Key::Char('?'), VIEW), KbdResult::Help);
        assert_eq!(state.interpret(Key::Ctrl('l'), VIEW), KbdResult::Clear);
        assert_eq!(state.interpret(Key::Char('q'), VIEW), KbdResult::Quit);
        assert_eq!(state.interpret(Key::Char('Q'), VIEW), KbdResult::Quit);
        assert_eq!(state.interpret(Key::Ctrl('c'), VIEW), KbdResult::Quit);
    }

    #[test]
    fn test_tiny_viewport_page_motion() {
        let mut state = DisplayState::new();
        state.interpret(Key::Char('f'), Viewport::new(1, 1));
        assert_eq!(state.line_offset(), 0);
    }

    fn motion_key() -> impl Strategy<Value = Key> {
        prop_oneof![
            Just(Key::Char('j')),
            Just(Key::Char('k')),
            Just(Key::Char('d')),
            Just(Key::Char('u')),
            Just(Key::Char('f')),
            Just(Key::Char('b')),
            Just(Key::Char('g')),
            Just(Key::Char('l')),
            Just(Key::Char('h')),
            Just(Key::Char('L')),
            Just(Key::Char('H')),
            Just(Key::Char('>')),
            Just(Key::Char('<')),
            Just(Key::Char('{')),
            Just(Key::Tab),
            Just(Key::Backspace),
            Just(Key::PageDown),
            (0u32..10).prop_map(|d| Key::Char(char::from_digit(d, 10).unwrap_or('0'))),
        ]
    }

    proptest! {
        #[test]
        fn prop_offsets_stay_in_bounds(
            keys in prop::collection::vec(motion_key(), 0..200),
            cols in 1u16..400,
            rows in 1u16..400,
        ) {
            let mut state = DisplayState::new();
            let view = Viewport::new(cols, rows);
            for key in keys {
                state.interpret(key, view);
                prop_assert!(state.line_offset() < MAXLINE);
                prop_assert!(state.column_offset() < MAXCOLUMN);
            }
        }
    }
}
