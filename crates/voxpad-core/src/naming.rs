//! Artifact filename derivation.
//!
//! Synthesis artifacts are named after the text that produced them:
//! `<sanitized-first-5-words>_<YYYYMMDD_HHMMSS>.m4a`. Two jobs completing
//! within the same wall-clock second with the same leading words produce
//! the same name and the second overwrites the first — a known limitation
//! of this scheme, kept as-is rather than papered over with de-duplication.

use chrono::{DateTime, Local};

/// File extension of the final compressed artifact.
pub const ARTIFACT_EXT: &str = "m4a";

/// How many leading words contribute to the base name.
const MAX_WORDS: usize = 5;

/// Maximum length of the sanitized base name, in characters.
const MAX_BASE_CHARS: usize = 80;

/// Derive a human-readable base name from input text.
///
/// Takes the first five whitespace-separated words, joins them with
/// underscores, strips everything outside letters/digits/underscore/
/// hyphen/whitespace, collapses whitespace runs to single underscores,
/// trims stray underscores, lowercases, and truncates to 80 characters.
/// Falls back to `"output"` when nothing survives sanitization.
#[must_use]
pub fn sanitize_base(text: &str) -> String {
    let joined = text
        .split_whitespace()
        .take(MAX_WORDS)
        .collect::<Vec<_>>()
        .join("_");

    let stripped: String = joined
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    // Collapse any remaining whitespace runs into single underscores.
    let mut name = String::with_capacity(stripped.len());
    let mut in_whitespace = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            if !in_whitespace && !name.is_empty() {
                name.push('_');
            }
            in_whitespace = true;
        } else {
            name.extend(c.to_lowercase());
            in_whitespace = false;
        }
    }
    let name = name.trim_matches('_');

    if name.is_empty() {
        return "output".to_string();
    }
    name.chars().take(MAX_BASE_CHARS).collect()
}

/// Full artifact filename for `text` completed at `when`.
#[must_use]
pub fn artifact_filename(text: &str, when: DateTime<Local>) -> String {
    format!(
        "{}_{}.{}",
        sanitize_base(text),
        when.format("%Y%m%d_%H%M%S"),
        ARTIFACT_EXT
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn first_five_words_lowercased_and_joined() {
        assert_eq!(
            sanitize_base("Hello, World! This is a test."),
            "hello_world_this_is_a"
        );
    }

    #[test]
    fn punctuation_only_falls_back_to_output() {
        assert_eq!(sanitize_base("!!! ???"), "output");
        assert_eq!(sanitize_base(""), "output");
        assert_eq!(sanitize_base("   "), "output");
    }

    #[test]
    fn hyphens_and_digits_survive() {
        assert_eq!(sanitize_base("Top-10 results for 2024"), "top-10_results_for_2024");
    }

    #[test]
    fn long_words_truncated_to_eighty_chars() {
        let text = "a".repeat(300);
        let base = sanitize_base(&text);
        assert_eq!(base.chars().count(), 80);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // Multi-byte letters near the cut must not split a code point.
        let text = "é".repeat(120);
        let base = sanitize_base(&text);
        assert_eq!(base.chars().count(), 80);
    }

    #[test]
    fn filename_includes_compact_timestamp_and_extension() {
        let when = Local.with_ymd_and_hms(2025, 3, 14, 15, 9, 26).unwrap();
        assert_eq!(
            artifact_filename("Hello there general Kenobi you", when),
            "hello_there_general_kenobi_you_20250314_150926.m4a"
        );
    }
}
