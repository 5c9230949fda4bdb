use std::borrow::Cow;

use crate::editor::{HEADER_ROWS, LineBuffer, Viewport};

pub const MORE_MARKER: &str = "more \u{2193}";
const MORE_MARKER_OFFSET: usize = 7;

/// Semantic color of a span; the terminal adapter maps it to a real color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Plain,
    Header,
    Text,
    Marker,
    Fetching,
    Content,
    Prompt,
    Error,
}

/// A single terminal operation. Every `Text` span carries its own color, so
/// executing one never changes the color of the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draw {
    Clear,
    MoveTo { col: usize, row: usize },
    Text { tone: Tone, text: String },
    NewLine,
    SaveCursor,
    RestoreCursor,
}

impl Draw {
    pub fn text(tone: Tone, text: impl Into<String>) -> Self {
        Draw::Text {
            tone,
            text: text.into(),
        }
    }

    pub fn lines(tone: Tone, text: &str) -> Vec<Draw> {
        let mut out = Vec::new();
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                out.push(Draw::NewLine);
            }
            let line = line.strip_suffix('\r').unwrap_or(line);
            if !line.is_empty() {
                out.push(Draw::text(tone, line));
            }
        }
        out
    }
}

pub fn render_editor(buffer: &LineBuffer, viewport: Viewport, header: &[String]) -> Vec<Draw> {
    let width = viewport.width;
    let max_row = viewport.max_visible_row();
    let lines = buffer.lines();
    let mut out = Vec::with_capacity((max_row + 1 + HEADER_ROWS) * 2 + 4);

    for row in 0..HEADER_ROWS {
        let line = header.get(row).map(String::as_str).unwrap_or("");
        out.push(Draw::MoveTo { col: 0, row });
        out.push(Draw::text(Tone::Header, fit_width(line, width)));
    }

    for i in 0..=max_row {
        let line = lines.get(i).map(String::as_str).unwrap_or("");
        out.push(Draw::MoveTo {
            col: 0,
            row: i + HEADER_ROWS,
        });
        out.push(Draw::text(Tone::Text, fit_width(line, width)));
    }

    if lines.len() - 1 > max_row {
        out.push(Draw::MoveTo {
            col: width.saturating_sub(MORE_MARKER_OFFSET),
            row: max_row + HEADER_ROWS,
        });
        out.push(Draw::text(Tone::Marker, MORE_MARKER));
    }

    let (row, col) = buffer.cursor();
    out.push(Draw::MoveTo {
        col,
        row: row + HEADER_ROWS,
    });
    out
}

/// Pads with spaces or cuts so the result is exactly `width` chars.
pub fn fit_width(value: &str, width: usize) -> String {
    let mut out: String = value.chars().take(width).collect();
    let len = out.chars().count();
    out.extend(std::iter::repeat_n(' ', width - len));
    out
}

pub fn truncate_chars(value: &str, max_chars: usize) -> Cow<'_, str> {
    match value.char_indices().nth(max_chars) {
        Some((idx, _)) => Cow::Owned(value[..idx].to_string()),
        None => Cow::Borrowed(value),
    }
}
