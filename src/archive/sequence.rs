// Sequence identifier parsing
// Extracts the hexadecimal sequence token from an archive's file name

use once_cell::sync::Lazy;
use regex::Regex;

/// Archive names follow the shape
/// `scene_<N>__<Letter><N>++seq__<hex-token>__<YYYY-MM-DD-HH-MM-SS>`.
/// The capture group is the hexadecimal sequence token.
static SEQUENCE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"scene_\d+__[A-Z]\d+\+\+seq__([a-f0-9]+)__\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2}")
        .expect("sequence pattern is a valid regex")
});

/// Extract the sequence identifier from an archive file name.
///
/// Returns `None` when the name does not match the expected shape. Matching
/// is purely structural; the timestamp segment is not validated beyond its
/// digit layout. Callers treat an absent identifier as a skippable archive,
/// never as a fatal condition.
pub fn extract_sequence_id(filename: &str) -> Option<String> {
    SEQUENCE_PATTERN
        .captures(filename)
        .map(|caps| caps[1].to_string())
}
