use super::Patterns;

const REGISTER_DIGITS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterMatch {
    /// Matched digits with OCR whitespace removed, in the order read.
    pub digits: String,
    /// Byte offset just past the raw run, including any trailing whitespace.
    pub end: usize,
}

pub fn find_register_number(patterns: &Patterns, line: &str) -> Option<RegisterMatch> {
    let raw = patterns.register_run.find(line)?;
    let digits = raw
        .as_str()
        .chars()
        .filter(|character| !character.is_whitespace())
        .collect::<String>();

    Some(RegisterMatch {
        digits,
        end: raw.end(),
    })
}

/// Undoes the one known column-bleed corruption: a stray leading `1` pushed
/// in front of a number starting with `2`. Only that fingerprint is touched.
pub fn fix_misaligned_register(candidate: &str) -> String {
    let bytes = candidate.as_bytes();
    let misaligned = candidate.len() == REGISTER_DIGITS
        && candidate.is_ascii()
        && bytes[0] == b'1'
        && bytes[1] == b'2';

    if misaligned {
        format!("{}{}", &candidate[1..], &candidate[..1])
    } else {
        candidate.to_string()
    }
}
