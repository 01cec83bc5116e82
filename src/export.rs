use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::model::{ExtractedTable, REGISTER_COLUMN, Row};
use crate::util::ensure_directory;

pub fn table_to_csv(table: &ExtractedTable) -> String {
    let mut out = csv_line(&table.header());
    for row in &table.rows {
        let mut cells = Vec::with_capacity(row.grades.len() + 1);
        cells.push(row.register_number.clone());
        cells.extend(row.grades.iter().cloned());
        out.push_str(&csv_line(&cells));
    }
    out
}

fn csv_line(cells: &[String]) -> String {
    let mut line = cells
        .iter()
        .map(|cell| escape_csv_cell(cell))
        .collect::<Vec<String>>()
        .join(",");
    line.push('\n');
    line
}

fn escape_csv_cell(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub fn write_csv(path: &Path, table: &ExtractedTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    fs::write(path, table_to_csv(table))
        .with_context(|| format!("failed to write csv file: {}", path.display()))
}

/// Reads back a table written by [`table_to_csv`]. Blank lines and CRLF
/// endings are tolerated.
pub fn parse_csv_table(text: &str) -> Result<ExtractedTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = records
        .next()
        .context("csv table has no header row")?
        .context("failed to read csv header row")?;
    let Some(first) = header.get(0) else {
        bail!("csv header row is empty");
    };
    if first != REGISTER_COLUMN {
        bail!("csv header must start with {REGISTER_COLUMN:?}, found {first:?}");
    }

    let mut rows = Vec::new();
    for (index, record) in records.enumerate() {
        let record = record.with_context(|| format!("failed to read csv row {}", index + 1))?;
        if record.len() != header.len() {
            bail!(
                "csv row {} has {} cells, expected {}",
                index + 1,
                record.len(),
                header.len()
            );
        }
        let mut cells = record.iter().map(ToOwned::to_owned);
        let register_number = cells.next().unwrap_or_default();
        rows.push(Row {
            register_number,
            grades: cells.collect(),
        });
    }

    Ok(ExtractedTable {
        columns: header.iter().skip(1).map(ToOwned::to_owned).collect(),
        rows,
    })
}
