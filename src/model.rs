use serde::{Deserialize, Serialize};

pub const REGISTER_COLUMN: &str = "Register No.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub register_number: String,
    pub grades: Vec<String>,
}

/// Column schema plus the rows that matched it exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl ExtractedTable {
    pub fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push(REGISTER_COLUMN.to_string());
        header.extend(self.columns.iter().cloned());
        header
    }
}

/// One table tagged with the transcript section it came from.
#[derive(Debug, Clone, Serialize)]
pub struct SourceTable<'a> {
    pub source: &'a str,
    #[serde(flatten)]
    pub table: &'a ExtractedTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct OcrEngineInfo {
    pub name: String,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InputFile {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    pub source: String,
    pub line_count: usize,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub outcome: String,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub report_version: u32,
    pub generated_at: String,
    pub command: String,
    pub ocr_engine: Option<OcrEngineInfo>,
    pub inputs: Vec<InputFile>,
    pub extractions: Vec<ExtractionReport>,
}
