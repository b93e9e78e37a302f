//! Input handling: crossterm events to interpreter keys.

use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use iwatch_core::Key;

/// An event the scheduler cares about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// A keystroke for the interpreter.
    Key(Key),
    /// The terminal changed size.
    Resize {
        /// New column count.
        width: u16,
        /// New row count.
        height: u16,
    },
}

/// Input handler for converting crossterm events to interpreter input.
#[derive(Debug, Default)]
pub struct InputHandler;

impl InputHandler {
    /// Create a new input handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Convert a crossterm event. Key releases, mouse, focus, and paste
    /// events are dropped.
    #[must_use]
    pub fn convert(&self, event: CrosstermEvent) -> Option<InputEvent> {
        match event {
            CrosstermEvent::Key(key) => self.convert_key(key).map(InputEvent::Key),
            CrosstermEvent::Resize(width, height) => Some(InputEvent::Resize { width, height }),
            _ => None,
        }
    }

    fn convert_key(&self, key: KeyEvent) -> Option<Key> {
        if key.kind == KeyEventKind::Release {
            return None;
        }

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char(c) = key.code {
                return Some(control_key(c.to_ascii_lowercase()));
            }
        }

        let converted = match key.code {
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::Enter => Key::Enter,
            KeyCode::Esc => Key::Esc,
            KeyCode::Tab => Key::Tab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Modifier(_) | KeyCode::CapsLock | KeyCode::NumLock => Key::Modifier,
            _ => Key::Unknown,
        };
        Some(converted)
    }
}

/// Control chords that terminals deliver as plain ASCII controls.
fn control_key(c: char) -> Key {
    match c {
        'h' => Key::Backspace,
        'i' => Key::Tab,
        'j' | 'm' => Key::Enter,
        '[' => Key::Esc,
        other => Key::Ctrl(other),
    }
}
