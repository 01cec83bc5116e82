use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use super::output::{emit_csv, extract_lines, input_file, write_report, write_table_json};
use crate::cli::ExtractArgs;
use crate::model::{ExtractionReport, SourceTable};
use crate::ocr::{OcrSource, all_lines, parse_transcript};
use crate::table::ExtractOptions;
use crate::util::{ensure_directory, safe_file_stem, write_json_pretty};

pub fn run(args: ExtractArgs) -> Result<()> {
    let text = fs::read_to_string(&args.transcript)
        .with_context(|| format!("failed to read transcript {}", args.transcript.display()))?;
    let fallback_name = args
        .transcript
        .file_name()
        .and_then(|name| name.to_str());

    let sources = parse_transcript(&text, fallback_name);
    let line_total = sources.iter().map(|source| source.lines.len()).sum::<usize>();
    if line_total == 0 {
        bail!("transcript {} contains no text lines", args.transcript.display());
    }

    info!(
        transcript = %args.transcript.display(),
        sources = sources.len(),
        lines = line_total,
        "starting extraction"
    );

    let options = args.table.extract_options();
    let (extractions, outcome) = if args.per_source {
        let output_dir = args
            .output
            .as_deref()
            .context("--per-source needs --output <directory>")?;
        extract_per_source(&sources, &options, output_dir, args.table.json_path.as_deref())
    } else {
        extract_combined(
            &all_lines(&sources),
            &options,
            args.output.as_deref(),
            args.table.json_path.as_deref(),
        )
    };

    if let Some(report_path) = &args.table.report_path {
        write_report(
            report_path,
            render_extract_command(&args),
            None,
            vec![input_file(&args.transcript)?],
            extractions,
        )?;
    }

    outcome
}

/// One extraction over every line; the usual path for a transcript.
pub(crate) fn extract_combined(
    lines: &[String],
    options: &ExtractOptions,
    output: Option<&Path>,
    json_path: Option<&Path>,
) -> (Vec<ExtractionReport>, Result<()>) {
    let (mut report, result) = extract_lines("combined", lines, options);

    let outcome = match result {
        Ok(table) => {
            report.output_path = output.map(|path| path.display().to_string());
            emit_csv(&table, output).and_then(|()| match json_path {
                Some(path) => write_table_json(path, &table),
                None => Ok(()),
            })
        }
        Err(err) => Err(anyhow::Error::new(err).context("table extraction failed")),
    };

    (vec![report], outcome)
}

/// Independent extraction per transcript section, one CSV each. Fails only
/// when no section produced a table.
fn extract_per_source(
    sources: &[OcrSource],
    options: &ExtractOptions,
    output_dir: &Path,
    json_path: Option<&Path>,
) -> (Vec<ExtractionReport>, Result<()>) {
    let mut reports = Vec::with_capacity(sources.len());
    let mut tables = Vec::new();
    let mut used_stems = HashSet::new();

    if let Err(err) = ensure_directory(output_dir) {
        return (reports, Err(err));
    }

    for source in sources {
        let (mut report, result) = extract_lines(&source.name, &source.lines, options);

        match result {
            Ok(table) => {
                let path = output_dir.join(format!(
                    "{}.csv",
                    unique_stem(&source.name, &mut used_stems)
                ));
                if let Err(err) = emit_csv(&table, Some(&path)) {
                    reports.push(report);
                    return (reports, Err(err));
                }
                report.output_path = Some(path.display().to_string());
                tables.push((source.name.as_str(), table));
            }
            Err(err) => {
                warn!(source = %source.name, error = %err, "no table for source");
            }
        }

        reports.push(report);
    }

    if tables.is_empty() {
        let outcome = Err(anyhow::anyhow!(
            "no transcript section produced a table ({} sections)",
            sources.len()
        ));
        return (reports, outcome);
    }

    info!(
        tables = tables.len(),
        sources = sources.len(),
        dir = %output_dir.display(),
        "per-source extraction complete"
    );

    let outcome = match json_path {
        Some(path) => {
            let tagged = tables
                .iter()
                .map(|(source, table)| SourceTable {
                    source: *source,
                    table,
                })
                .collect::<Vec<_>>();
            write_json_pretty(path, &tagged)
        }
        None => Ok(()),
    };

    (reports, outcome)
}

fn unique_stem(name: &str, used: &mut HashSet<String>) -> String {
    let base = safe_file_stem(name);
    let mut candidate = base.clone();
    let mut suffix = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{base}_{suffix}");
        suffix += 1;
    }
    candidate
}

fn render_extract_command(args: &ExtractArgs) -> String {
    let mut command = vec![
        "gradesheet".to_string(),
        "extract".to_string(),
        "--transcript".to_string(),
        args.transcript.display().to_string(),
    ];

    if let Some(path) = &args.output {
        command.push("--output".to_string());
        command.push(path.display().to_string());
    }
    if args.per_source {
        command.push("--per-source".to_string());
    }
    if args.table.keep_register_order {
        command.push("--keep-register-order".to_string());
    }
    if let Some(path) = &args.table.json_path {
        command.push("--json-path".to_string());
        command.push(path.display().to_string());
    }
    if let Some(path) = &args.table.report_path {
        command.push("--report-path".to_string());
        command.push(path.display().to_string());
    }

    command.join(" ")
}
