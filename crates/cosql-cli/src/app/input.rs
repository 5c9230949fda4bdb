use cosql_core::Key;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Resize, mouse, focus, paste and release events all collapse to `Key::None`,
/// which wakes the editor loop for a redraw without editing anything.
pub fn map_event(event: Event) -> Key {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => map_key(key),
        _ => Key::None,
    }
}

pub fn map_key(key: KeyEvent) -> Key {
    match (key.code, key.modifiers) {
        (KeyCode::Char(c), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            Key::ctrl(c)
        }
        (KeyCode::Char(c), _) => Key::Char(c),
        (KeyCode::Backspace, _) => Key::Backspace,
        (KeyCode::Delete, _) => Key::Delete,
        (KeyCode::Enter, _) => Key::Enter,
        (KeyCode::Left, _) => Key::Left,
        (KeyCode::Right, _) => Key::Right,
        (KeyCode::Up, _) => Key::Up,
        (KeyCode::Down, _) => Key::Down,
        (KeyCode::Home, _) => Key::Home,
        (KeyCode::End, _) => Key::End,
        (KeyCode::Tab, _) => Key::Tab,
        (KeyCode::Esc, _) => Key::Escape,
        (KeyCode::Insert, _) => Key::Insert,
        (KeyCode::PageUp, _) => Key::PageUp,
        (KeyCode::PageDown, _) => Key::PageDown,
        _ => Key::None,
    }
}
