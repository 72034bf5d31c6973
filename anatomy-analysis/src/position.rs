//! Placeholder detection and word-position bucketing.

use std::sync::LazyLock;

use anatomy_primitives::Position;
use regex::Regex;
use tracing::trace;

static PLACEHOLDER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{[A-Za-z0-9_.$]*\}\}|\{[A-Za-z0-9_.$]*\}|PLACEHOLDER")
        .expect("placeholder pattern is valid")
});

static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("word pattern is valid"));

/// Returns every placeholder token in `text`, left to right.
///
/// Recognised forms are `{{name}}`, `{name}` and the bare marker
/// `PLACEHOLDER`; names may contain ASCII letters, digits, `_`, `.` and `$`.
/// Repeated placeholders are reported once per occurrence.
#[must_use]
pub fn detect_placeholders(text: &str) -> Vec<&str> {
    PLACEHOLDER_PATTERN
        .find_iter(text)
        .map(|found| found.as_str())
        .collect()
}

/// Buckets a word index into prompt thirds.
///
/// Equivalent to comparing `word_index` against `total_words / 3` and
/// `2 * total_words / 3` as real numbers, evaluated without truncation.
#[must_use]
pub fn classify_position(word_index: usize, total_words: usize) -> Position {
    let scaled = word_index.saturating_mul(3);
    if scaled <= total_words {
        Position::Beginning
    } else if scaled >= total_words.saturating_mul(2) {
        Position::End
    } else {
        Position::Middle
    }
}

/// Pairs each placeholder with its relative position in `text`.
///
/// The position of a placeholder is taken from its first occurrence in the
/// text, measured in words preceding it. Placeholders that do not occur in
/// `text` are skipped.
pub fn relative_word_positions<'p, S>(text: &str, placeholders: &'p [S]) -> Vec<(&'p str, Position)>
where
    S: AsRef<str>,
{
    let total_words = WORD_PATTERN.find_iter(text).count();

    placeholders
        .iter()
        .map(|placeholder| -> &'p str { placeholder.as_ref() })
        .filter_map(|placeholder| {
            let Some(offset) = text.find(placeholder) else {
                trace!(placeholder, "placeholder not found in text; skipping");
                return None;
            };
            let word_index = WORD_PATTERN.find_iter(&text[..offset]).count();
            Some((placeholder, classify_position(word_index, total_words)))
        })
        .collect()
}
