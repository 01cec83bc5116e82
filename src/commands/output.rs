use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::export::{table_to_csv, write_csv};
use crate::model::{ExtractedTable, ExtractionReport, InputFile, OcrEngineInfo, RunReport};
use crate::table::{ExtractError, ExtractOptions, extract_table};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

/// Extracts one line sequence and records its outcome, successful or not.
pub(crate) fn extract_lines(
    source: &str,
    lines: &[String],
    options: &ExtractOptions,
) -> (ExtractionReport, Result<ExtractedTable, ExtractError>) {
    let result = extract_table(lines, options);

    let (columns, row_count, outcome) = match &result {
        Ok(table) => (table.columns.clone(), table.rows.len(), "ok"),
        Err(ExtractError::NoRowsExtracted { columns }) => {
            (columns.clone(), 0, "no_rows_extracted")
        }
        Err(err) => (Vec::new(), 0, err.outcome()),
    };

    let report = ExtractionReport {
        source: source.to_string(),
        line_count: lines.len(),
        columns,
        row_count,
        outcome: outcome.to_string(),
        output_path: None,
    };

    (report, result)
}

/// Writes the CSV to `output`, or to stdout when no path is given.
pub(crate) fn emit_csv(table: &ExtractedTable, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            write_csv(path, table)?;
            info!(
                path = %path.display(),
                rows = table.rows.len(),
                columns = table.columns.len(),
                "wrote grade table"
            );
        }
        None => {
            let mut out = io::BufWriter::new(io::stdout().lock());
            out.write_all(table_to_csv(table).as_bytes())
                .context("failed to write csv to stdout")?;
            out.flush()?;
        }
    }
    Ok(())
}

pub(crate) fn input_file(path: &Path) -> Result<InputFile> {
    Ok(InputFile {
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
    })
}

pub(crate) fn write_report(
    path: &Path,
    command: String,
    ocr_engine: Option<OcrEngineInfo>,
    inputs: Vec<InputFile>,
    extractions: Vec<ExtractionReport>,
) -> Result<()> {
    let report = RunReport {
        report_version: 1,
        generated_at: now_utc_string(),
        command,
        ocr_engine,
        inputs,
        extractions,
    };

    write_json_pretty(path, &report)?;
    info!(path = %path.display(), "wrote run report");
    Ok(())
}

pub(crate) fn write_table_json(path: &Path, table: &ExtractedTable) -> Result<()> {
    write_json_pretty(path, table)?;
    info!(path = %path.display(), "wrote grade table json");
    Ok(())
}
