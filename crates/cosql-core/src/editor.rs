use crate::key::Key;

pub const HEADER_ROWS: usize = 2;
pub const SEED_QUERY: &str = "select * from c";

const TAB_WIDTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: usize,
    pub height: usize,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
        }
    }

    pub fn max_visible_row(&self) -> usize {
        self.height.saturating_sub(HEADER_ROWS + 1)
    }

    pub fn max_visible_col(&self) -> usize {
        self.width.saturating_sub(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Clipboard,
    InsertMode,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Clipboard => {
                "Copy/paste is not handled here, use your terminal's own copy/paste.\nHit any key to continue..."
            }
            Notice::InsertMode => "Insert mode is always ON.\nHit any key to continue...",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Execute,
    Exit,
    Notice(Notice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBuffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(SEED_QUERY)
    }
}

impl LineBuffer {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            lines: vec![seed.into()],
            row: 0,
            col: 0,
        }
    }

    pub fn from_lines(lines: Vec<String>, row: usize, col: usize) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        let row = row.min(lines.len() - 1);
        let col = col.min(char_len(&lines[row]));
        Self { lines, row, col }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn query(&self) -> String {
        self.lines.join(" ")
    }

    pub fn handle_key(&mut self, key: Key, viewport: Viewport) -> Action {
        match key {
            Key::Backspace => self.backspace(),
            Key::Delete => self.delete(),
            Key::Left => self.move_left(),
            Key::Right => self.move_right(),
            Key::Up => self.move_up(),
            Key::Down => self.move_down(viewport.max_visible_row()),
            Key::Home => self.col = 0,
            Key::End => self.col = self.line_len(),
            Key::Tab => self.insert_tab(viewport.max_visible_col()),
            Key::Enter => self.split_line(viewport.max_visible_row()),
            Key::Escape => return Action::Exit,
            Key::Insert => return Action::Notice(Notice::InsertMode),
            Key::Ctrl(c) => match c.to_ascii_lowercase() {
                'e' => return Action::Execute,
                'x' | 'c' | 'v' => return Action::Notice(Notice::Clipboard),
                _ => {}
            },
            Key::Char(c) if !c.is_control() => self.insert_char(c, viewport.max_visible_col()),
            Key::Char(_) | Key::PageUp | Key::PageDown | Key::None => {}
        }
        Action::Continue
    }

    /// Fits the cursor and the current line into a viewport that may have
    /// changed size since the last key.
    pub fn reconcile(&mut self, viewport: Viewport) {
        let limit = viewport.width.saturating_sub(1);
        let line = &mut self.lines[self.row];
        if char_len(line) > limit {
            let cut = byte_index(line, limit);
            line.truncate(cut);
        }
        self.col = self.col.min(viewport.max_visible_col());
        self.row = self.row.min(viewport.max_visible_row());
        self.col = self.col.min(self.line_len());
    }

    pub fn apply(&mut self, key: Key, viewport: Viewport) -> Action {
        let action = self.handle_key(key, viewport);
        self.reconcile(viewport);
        action
    }

    fn backspace(&mut self) {
        if self.col > 0 {
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col - 1);
            line.remove(at);
            self.col -= 1;
        } else if self.row > 0 && self.lines[self.row - 1].is_empty() {
            self.row -= 1;
            self.lines.remove(self.row);
        } else if self.row > 0 {
            let tail = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len();
            self.lines[self.row].push_str(&tail);
        }
    }

    fn delete(&mut self) {
        let len = self.line_len();
        let is_last = self.row + 1 == self.lines.len();
        if self.col < len {
            let line = &mut self.lines[self.row];
            let at = byte_index(line, self.col);
            line.remove(at);
        } else if !is_last {
            if len == 0 {
                self.lines.remove(self.row);
            } else {
                let next = self.lines.remove(self.row + 1);
                self.lines[self.row].push_str(&next);
            }
        }
    }

    fn move_left(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    fn move_right(&mut self) {
        if self.col < self.line_len() {
            self.col += 1;
        }
    }

    fn move_up(&mut self) {
        if self.row > 0 {
            self.row -= 1;
            self.col = self.col.min(self.line_len());
        }
    }

    fn move_down(&mut self, max_row: usize) {
        if self.row < (self.lines.len() - 1).min(max_row) {
            self.row += 1;
            self.col = self.col.min(self.line_len());
        }
    }

    fn insert_tab(&mut self, max_col: usize) {
        if self.line_len() + TAB_WIDTH > max_col {
            return;
        }
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        line.insert_str(at, &" ".repeat(TAB_WIDTH));
        self.col += TAB_WIDTH;
    }

    fn split_line(&mut self, max_row: usize) {
        if self.row >= max_row {
            return;
        }
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        let tail = line.split_off(at);
        self.row += 1;
        self.col = 0;
        self.lines.insert(self.row, tail);
    }

    fn insert_char(&mut self, c: char, max_col: usize) {
        if self.col >= max_col {
            return;
        }
        let line = &mut self.lines[self.row];
        let at = byte_index(line, self.col);
        line.insert(at, c);
        self.col += 1;
    }

    fn line_len(&self) -> usize {
        char_len(&self.lines[self.row])
    }
}

fn char_len(line: &str) -> usize {
    line.chars().count()
}

fn byte_index(line: &str, col: usize) -> usize {
    line.char_indices().nth(col).map_or(line.len(), |(idx, _)| idx)
}
