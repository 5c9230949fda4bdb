#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    /// Ctrl plus a letter, always lowercase.
    Ctrl(char),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Tab,
    Escape,
    Insert,
    PageUp,
    PageDown,
    /// No key: resizes, releases and keys the editor does not know.
    None,
}

impl Key {
    pub fn ctrl(c: char) -> Self {
        Key::Ctrl(c.to_ascii_lowercase())
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Key::None)
    }
}
