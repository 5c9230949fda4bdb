use std::borrow::Cow;

use crate::config::Config;

pub const EDITOR_HINT: &str = "Editor Mode | Press CTRL+E to execute query | ESC to exit";

/// The two header rows above the editor. A long endpoint is shortened in the
/// middle so the database and container stay visible.
pub fn header_lines(config: &Config, width: usize) -> Vec<String> {
    let tail = format!("({})({})({})", config.mode, config.database, config.container);
    let fixed = "cosql | ()".chars().count() + tail.chars().count();
    let endpoint = match width.checked_sub(fixed) {
        Some(budget) if budget >= 8 => truncate_middle(&config.endpoint, budget),
        _ => Cow::Borrowed(config.endpoint.as_str()),
    };
    vec![format!("cosql | ({endpoint}){tail}"), EDITOR_HINT.to_string()]
}

pub fn truncate_middle(value: &str, max_chars: usize) -> Cow<'_, str> {
    let total = value.chars().count();
    if total <= max_chars {
        return Cow::Borrowed(value);
    }
    if max_chars <= 3 {
        return Cow::Owned(".".repeat(max_chars));
    }

    let keep = max_chars - 3;
    let head = keep / 2;
    let tail = keep - head;
    let start: String = value.chars().take(head).collect();
    let end: String = value.chars().skip(total - tail).collect();
    Cow::Owned(format!("{start}...{end}"))
}
