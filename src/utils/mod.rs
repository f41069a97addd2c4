// Utility functions

use chrono::{DateTime, Utc};

/// First `max_chars` characters of `text`, never splitting a character
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// `YYYY-MM-DD` for report titles
pub fn date_label(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM UTC` for report footers
pub fn timestamp_label(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Markdown bullet list, one `- item` per line
pub fn bullet_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
