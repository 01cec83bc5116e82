use super::{MIN_SCHEMA_CODES, Patterns};

/// Returns the subject codes of the first line holding at least
/// `MIN_SCHEMA_CODES` of them, left to right. Codes are never merged across
/// lines.
pub fn discover_columns<S: AsRef<str>>(patterns: &Patterns, lines: &[S]) -> Option<Vec<String>> {
    lines.iter().find_map(|line| {
        let codes = patterns
            .subject_code
            .find_iter(line.as_ref())
            .map(|m| m.as_str().to_string())
            .collect::<Vec<String>>();

        (codes.len() >= MIN_SCHEMA_CODES).then_some(codes)
    })
}
