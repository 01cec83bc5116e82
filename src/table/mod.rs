//! Grade-sheet reconstruction from OCR text lines.
//!
//! Column discovery picks the subject-code header line, then row assembly
//! walks the lines once, pairing each register number with exactly one grade
//! per discovered column.

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

use crate::model::ExtractedTable;

mod columns;
mod register;
mod rows;

pub use columns::discover_columns;
pub use register::{find_register_number, fix_misaligned_register};
pub use rows::assemble_rows;

/// A line must carry at least this many subject codes to define the schema.
pub const MIN_SCHEMA_CODES: usize = 3;

const SUBJECT_CODE_PATTERN: &str = r"\b[0-9]{2}[A-Z]{3,4}[0-9]{2}\b";
const REGISTER_RUN_PATTERN: &str = r"(?:[0-9]\s*){16}";
const GRADE_TOKEN_PATTERN: &str = r"^[A-Z+\-]+$";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error(
        "no subject-code header line found (need at least {} codes on one line)",
        MIN_SCHEMA_CODES
    )]
    SchemaNotFound,

    #[error(
        "subject codes found ({}) but no valid rows matched {} grades",
        .columns.join(", "),
        .columns.len()
    )]
    NoRowsExtracted { columns: Vec<String> },

    #[error("failed to compile extraction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

impl ExtractError {
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::SchemaNotFound => "schema_not_found",
            Self::NoRowsExtracted { .. } => "no_rows_extracted",
            Self::Pattern(_) => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Rotate register numbers carrying the leading-`1` bleed fingerprint.
    pub fix_misaligned_registers: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            fix_misaligned_registers: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Patterns {
    subject_code: Regex,
    register_run: Regex,
    grade_token: Regex,
}

impl Patterns {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            subject_code: Regex::new(SUBJECT_CODE_PATTERN)?,
            register_run: Regex::new(REGISTER_RUN_PATTERN)?,
            grade_token: Regex::new(GRADE_TOKEN_PATTERN)?,
        })
    }

    pub fn is_grade_token(&self, token: &str) -> bool {
        self.grade_token.is_match(token)
    }
}

/// Runs column discovery followed by row assembly over one line sequence.
pub fn extract_table<S: AsRef<str>>(
    lines: &[S],
    options: &ExtractOptions,
) -> Result<ExtractedTable, ExtractError> {
    let patterns = Patterns::new()?;

    let columns = discover_columns(&patterns, lines).ok_or(ExtractError::SchemaNotFound)?;
    debug!(columns = %columns.join(","), "discovered subject codes");

    let rows = assemble_rows(&patterns, lines, columns.len(), options);
    if rows.is_empty() {
        return Err(ExtractError::NoRowsExtracted { columns });
    }

    info!(
        columns = columns.len(),
        rows = rows.len(),
        lines = lines.len(),
        "table extracted"
    );

    Ok(ExtractedTable { columns, rows })
}
