//! Identifier derivation for result histories and export files.
//!
//! Quiz ids are lossy: the title is lowercased, stripped to `[a-z0-9]` and
//! cut at 20 characters, so distinct titles sharing a long prefix resolve to
//! the same history file.

use crate::constants::{
    EXPORT_DATE_FORMAT, FALLBACK_QUIZ_ID, NUMERIC_ID_MODULUS, NUMERIC_ID_WIDTH, QUIZ_ID_MAX_LEN,
};
use chrono::NaiveDate;
use std::hash::Hasher;
use twox_hash::XxHash64;

const fn is_id_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Derive the storage key for a quiz title.
#[must_use]
pub fn quiz_id_for_title(title: &str) -> String {
    let id: String = title
        .to_lowercase()
        .chars()
        .filter(|c| is_id_char(*c))
        .take(QUIZ_ID_MAX_LEN)
        .collect();
    // Also covers non-blank titles without a single id character, which
    // would otherwise map to a bare `-results.json` file.
    if id.is_empty() {
        FALLBACK_QUIZ_ID.to_string()
    } else {
        id
    }
}

/// Display-only number derived from a quiz id, e.g. `"048213"`.
#[must_use]
pub fn numeric_id_for(quiz_id: &str) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(quiz_id.as_bytes());
    let value = hasher.finish() % NUMERIC_ID_MODULUS;
    format!("{value:0width$}", width = NUMERIC_ID_WIDTH)
}

/// Suggested CSV file name, e.g. `my-quiz-2024-05-01.csv`.
#[must_use]
pub fn export_file_name(quiz_name: &str, date: NaiveDate) -> String {
    let mut slug = String::with_capacity(quiz_name.len());
    for c in quiz_name.to_lowercase().chars() {
        if is_id_char(c) {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    format!("{slug}-{}.csv", date.format(EXPORT_DATE_FORMAT))
}
