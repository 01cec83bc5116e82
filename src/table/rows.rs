use tracing::debug;

use super::{ExtractOptions, Patterns, find_register_number, fix_misaligned_register};
use crate::model::Row;

/// Single forward pass over `lines`, emitting rows with exactly
/// `column_count` grades.
///
/// Grades are taken first from the identifier line (tokens after the
/// register run), then one per following line whose whole trimmed text is a
/// grade token. A complete row moves the cursor past its last grade line; an
/// incomplete candidate is dropped and scanning resumes on the next line.
pub fn assemble_rows<S: AsRef<str>>(
    patterns: &Patterns,
    lines: &[S],
    column_count: usize,
    options: &ExtractOptions,
) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        match assemble_row_at(patterns, lines, cursor, column_count, options) {
            RowAttempt::NoIdentifier => cursor += 1,
            RowAttempt::Incomplete { collected } => {
                debug!(
                    line = cursor,
                    collected,
                    expected = column_count,
                    "dropping incomplete row"
                );
                cursor += 1;
            }
            RowAttempt::Complete { row, next } => {
                rows.push(row);
                cursor = next;
            }
        }
    }

    rows
}

enum RowAttempt {
    NoIdentifier,
    Incomplete { collected: usize },
    Complete { row: Row, next: usize },
}

fn assemble_row_at<S: AsRef<str>>(
    patterns: &Patterns,
    lines: &[S],
    index: usize,
    column_count: usize,
    options: &ExtractOptions,
) -> RowAttempt {
    let line = lines[index].as_ref();
    let Some(register) = find_register_number(patterns, line) else {
        return RowAttempt::NoIdentifier;
    };

    let mut grades = line[register.end..]
        .split_whitespace()
        .filter(|token| patterns.is_grade_token(token))
        .map(ToOwned::to_owned)
        .collect::<Vec<String>>();

    let mut next = index + 1;
    while grades.len() < column_count && next < lines.len() {
        let candidate = lines[next].as_ref().trim();
        if patterns.is_grade_token(candidate) {
            grades.push(candidate.to_string());
        }
        next += 1;
    }

    if grades.len() != column_count {
        return RowAttempt::Incomplete {
            collected: grades.len(),
        };
    }

    let register_number = if options.fix_misaligned_registers {
        fix_misaligned_register(&register.digits)
    } else {
        register.digits
    };

    RowAttempt::Complete {
        row: Row {
            register_number,
            grades,
        },
        next,
    }
}
