//! Input model: pointer/keyboard events and shortcut chords.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether the platform command chord key (Ctrl or Cmd) is held.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
}

/// Keyboard event type. Key names follow the browser convention
/// (`"z"`, `"Delete"`, `"Backspace"`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Editing shortcuts reachable from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    Undo,
    Redo,
    DeleteSelection,
}

impl Shortcut {
    /// Resolve a key press into a shortcut, if it matches a chord.
    ///
    /// Undo is Ctrl/Cmd+Z. Redo answers to both Ctrl/Cmd+Shift+Z and
    /// Ctrl/Cmd+Y. Delete and Backspace remove the selection.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<Self> {
        match key {
            "z" | "Z" if modifiers.command() && modifiers.shift => Some(Shortcut::Redo),
            "z" | "Z" if modifiers.command() => Some(Shortcut::Undo),
            "y" | "Y" if modifiers.command() => Some(Shortcut::Redo),
            "Delete" | "Backspace" => Some(Shortcut::DeleteSelection),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mods(shift: bool, ctrl: bool, meta: bool) -> Modifiers {
        Modifiers {
            shift,
            ctrl,
            alt: false,
            meta,
        }
    }

    #[test]
    fn test_undo_chord() {
        assert_eq!(
            Shortcut::resolve("z", mods(false, true, false)),
            Some(Shortcut::Undo)
        );
        assert_eq!(
            Shortcut::resolve("z", mods(false, false, true)),
            Some(Shortcut::Undo)
        );
        assert_eq!(Shortcut::resolve("z", mods(false, false, false)), None);
    }

    #[test]
    fn test_both_redo_chords() {
        assert_eq!(
            Shortcut::resolve("z", mods(true, true, false)),
            Some(Shortcut::Redo)
        );
        assert_eq!(
            Shortcut::resolve("Z", mods(true, false, true)),
            Some(Shortcut::Redo)
        );
        assert_eq!(
            Shortcut::resolve("y", mods(false, true, false)),
            Some(Shortcut::Redo)
        );
    }

    #[test]
    fn test_delete_chords() {
        assert_eq!(
            Shortcut::resolve("Delete", Modifiers::default()),
            Some(Shortcut::DeleteSelection)
        );
        assert_eq!(
            Shortcut::resolve("Backspace", Modifiers::default()),
            Some(Shortcut::DeleteSelection)
        );
    }

    #[test]
    fn test_plain_keys_resolve_to_nothing() {
        assert_eq!(Shortcut::resolve("a", Modifiers::default()), None);
        assert_eq!(Shortcut::resolve("Escape", Modifiers::default()), None);
    }
}
