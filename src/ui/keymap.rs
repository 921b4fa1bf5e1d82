//! Default key bindings for speakwave

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Key chord: code plus modifiers
pub type KeyChord = (KeyCode, KeyModifiers);

/// Action identifier for key bindings
///
/// Keys not found in the map are treated as text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    // Buttons
    Play,
    Save,
    Stop,
    Quit,

    // Clipboard
    Paste,

    // Focus
    FocusNext,
    FocusPrev,

    // Focused control
    Decrease,
    Increase,
}

/// Create the default keymap
pub fn create_default_keymap() -> HashMap<KeyChord, Action> {
    let mut map = HashMap::new();

    // Buttons (ctrl+p/s/x/q)
    map.insert((KeyCode::Char('p'), KeyModifiers::CONTROL), Action::Play);
    map.insert((KeyCode::Char('s'), KeyModifiers::CONTROL), Action::Save);
    map.insert((KeyCode::Char('x'), KeyModifiers::CONTROL), Action::Stop);
    map.insert((KeyCode::Esc, KeyModifiers::NONE), Action::Stop);
    map.insert((KeyCode::Char('q'), KeyModifiers::CONTROL), Action::Quit);
    // Raw mode swallows SIGINT
    map.insert((KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);

    map.insert((KeyCode::Char('v'), KeyModifiers::CONTROL), Action::Paste);

    // Focus cycling; some terminals report shift on BackTab, some don't
    map.insert((KeyCode::Tab, KeyModifiers::NONE), Action::FocusNext);
    map.insert((KeyCode::BackTab, KeyModifiers::NONE), Action::FocusPrev);
    map.insert((KeyCode::BackTab, KeyModifiers::SHIFT), Action::FocusPrev);

    map.insert((KeyCode::Left, KeyModifiers::NONE), Action::Decrease);
    map.insert((KeyCode::Right, KeyModifiers::NONE), Action::Increase);

    map
}

/// Find the action bound to a key event
///
/// Upper-case letters with CONTROL are folded to lower case so Ctrl+Shift+P
/// behaves like Ctrl+P.
pub fn lookup(map: &HashMap<KeyChord, Action>, key: &KeyEvent) -> Option<Action> {
    let code = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyCode::Char(c.to_ascii_lowercase())
        }
        other => other,
    };
    let mut modifiers = key.modifiers;
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        modifiers.remove(KeyModifiers::SHIFT);
    }
    map.get(&(code, modifiers)).copied()
}
