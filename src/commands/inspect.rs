use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::InspectArgs;
use crate::export::parse_csv_table;
use crate::model::ExtractedTable;

pub fn run(args: InspectArgs) -> Result<()> {
    let text = fs::read_to_string(&args.table)
        .with_context(|| format!("failed to read {}", args.table.display()))?;
    let table = parse_csv_table(&text)
        .with_context(|| format!("failed to parse {}", args.table.display()))?;

    info!(
        path = %args.table.display(),
        columns = table.columns.len(),
        rows = table.rows.len(),
        "loaded grade table"
    );

    let mut output = io::BufWriter::new(io::stdout().lock());
    output.write_all(render_grade_summary(&table).as_bytes())?;
    output.flush()?;
    Ok(())
}

/// Per-subject grade counts, one line per subject code in column order.
pub(crate) fn render_grade_summary(table: &ExtractedTable) -> String {
    let mut out = format!("Rows: {}\n", table.rows.len());

    for (index, code) in table.columns.iter().enumerate() {
        let mut counts = BTreeMap::<&str, usize>::new();
        for row in &table.rows {
            if let Some(grade) = row.grades.get(index) {
                *counts.entry(grade.as_str()).or_default() += 1;
            }
        }

        let rendered = counts
            .iter()
            .map(|(grade, count)| format!("{grade}={count}"))
            .collect::<Vec<String>>()
            .join(" ");
        out.push_str(&format!("{code}: {rendered}\n"));
    }

    out
}
