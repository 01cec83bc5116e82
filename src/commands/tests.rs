use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde_json::Value;

use crate::cli::{ConvertArgs, ExtractArgs, OcrEngineArgs, TableArgs};
use crate::export::parse_csv_table;
use crate::model::{ExtractedTable, Row};
use crate::ocr::OcrEngine;

const TRANSCRIPT: &str = "\
=== page1.jpg ===
SEMESTER RESULTS
Register No. 20MSS11 20MSS12 20MSS13
2403717672622001 O A+ B
1240371767262200
A
B-
noise line
C

=== page2.jpg ===
2403717672622003 U W
";

fn table_args(dir: &Path) -> TableArgs {
    TableArgs {
        keep_register_order: false,
        json_path: Some(dir.join("table.json")),
        report_path: Some(dir.join("report.json")),
    }
}

fn extract_args(dir: &Path, transcript: &str) -> ExtractArgs {
    let path = dir.join("ocr_output.txt");
    fs::write(&path, transcript).expect("write transcript");

    ExtractArgs {
        transcript: path,
        output: Some(dir.join("extracted_table.csv")),
        per_source: false,
        table: table_args(dir),
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_slice(&fs::read(path).expect("read json")).expect("parse json")
}

#[test]
fn extract_writes_csv_json_and_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = extract_args(dir.path(), TRANSCRIPT);

    super::extract::run(args).expect("extract");

    let csv = fs::read_to_string(dir.path().join("extracted_table.csv")).expect("csv");
    assert_eq!(
        csv,
        "Register No.,20MSS11,20MSS12,20MSS13\n\
         2403717672622001,O,A+,B\n\
         2403717672622001,A,B-,C\n"
    );

    let table: ExtractedTable =
        serde_json::from_slice(&fs::read(dir.path().join("table.json")).expect("json"))
            .expect("table json");
    assert_eq!(table, parse_csv_table(&csv).expect("parse csv"));

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["extractions"][0]["outcome"], "ok");
    assert_eq!(report["extractions"][0]["row_count"], 2);
    assert_eq!(report["inputs"][0]["sha256"].as_str().map(str::len), Some(64));
    assert!(report["ocr_engine"].is_null());
}

#[test]
fn extract_keeps_register_order_when_asked() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut args = extract_args(dir.path(), TRANSCRIPT);
    args.table.keep_register_order = true;

    super::extract::run(args).expect("extract");

    let csv = fs::read_to_string(dir.path().join("extracted_table.csv")).expect("csv");
    assert!(csv.contains("1240371767262200,A,B-,C\n"));
}

#[test]
fn extract_reports_missing_schema_distinctly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = extract_args(dir.path(), "2403717672622001 A B C\n20MSS11 20MSS12\n");

    let err = super::extract::run(args).unwrap_err();
    assert!(format!("{err:#}").contains("no subject-code header line found"));

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["extractions"][0]["outcome"], "schema_not_found");
    assert!(!dir.path().join("extracted_table.csv").exists());
}

#[test]
fn extract_reports_empty_rows_distinctly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = extract_args(dir.path(), "20MSS11 20MSS12 20MSS13\n2403717672622001 A\n");

    let err = super::extract::run(args).unwrap_err();
    assert!(format!("{err:#}").contains("no valid rows"));

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["extractions"][0]["outcome"], "no_rows_extracted");
    assert_eq!(report["extractions"][0]["columns"][2], "20MSS13");
}

#[test]
fn extract_rejects_empty_transcript() {
    let dir = tempfile::tempdir().expect("tempdir");
    let args = extract_args(dir.path(), "=== page1.jpg ===\n\n");
    assert!(super::extract::run(args).is_err());
}

#[test]
fn per_source_extraction_isolates_sections() {
    let dir = tempfile::tempdir().expect("tempdir");
    let transcript = "\
=== sheet 1.jpg ===
20MSS11 20MSS12 20MSS13
2403717672622001 O A B
=== sheet 2.jpg ===
2403717672622002 O A B
=== sheet 3.jpg ===
20ABC01 20ABC02 20ABC03 20ABC04
2403717672622003 O
A
B
C
";
    let mut args = extract_args(dir.path(), transcript);
    let out_dir = dir.path().join("tables");
    args.output = Some(out_dir.clone());
    args.per_source = true;

    super::extract::run(args).expect("extract");

    let first = parse_csv_table(&fs::read_to_string(out_dir.join("sheet_1.csv")).expect("csv"))
        .expect("parse");
    assert_eq!(first.columns, vec!["20MSS11", "20MSS12", "20MSS13"]);
    assert_eq!(first.rows.len(), 1);
    assert!(!out_dir.join("sheet_2.csv").exists());

    let third = parse_csv_table(&fs::read_to_string(out_dir.join("sheet_3.csv")).expect("csv"))
        .expect("parse");
    assert_eq!(
        third.rows,
        vec![Row {
            register_number: "2403717672622003".to_string(),
            grades: vec!["O", "A", "B", "C"].into_iter().map(String::from).collect(),
        }]
    );

    let report = read_json(&dir.path().join("report.json"));
    let outcomes = report["extractions"]
        .as_array()
        .expect("extractions")
        .iter()
        .map(|entry| entry["outcome"].as_str().unwrap_or_default().to_string())
        .collect::<Vec<_>>();
    assert_eq!(outcomes, vec!["ok", "schema_not_found", "ok"]);

    let tables = read_json(&dir.path().join("table.json"));
    assert_eq!(tables[0]["source"], "sheet 1.jpg");
    assert_eq!(tables[1]["source"], "sheet 3.jpg");
}

#[test]
fn per_source_fails_when_every_section_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut args = extract_args(dir.path(), "=== a.jpg ===\nnothing here\n");
    args.output = Some(dir.path().join("tables"));
    args.per_source = true;

    let err = super::extract::run(args).unwrap_err();
    assert!(err.to_string().contains("no transcript section produced a table"));
}

#[test]
fn per_source_needs_output_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut args = extract_args(dir.path(), TRANSCRIPT);
    args.output = None;
    args.per_source = true;

    assert!(super::extract::run(args).is_err());
}

struct PagedEngine;

impl OcrEngine for PagedEngine {
    fn name(&self) -> &str {
        "paged"
    }

    fn version(&self) -> Option<String> {
        Some("paged 1.0".to_string())
    }

    fn recognize(&self, image: &Path) -> Result<Vec<String>> {
        let lines: &[&str] = match image.file_name().and_then(|name| name.to_str()) {
            Some("page1.png") => &["Register No. 20MSS11 20MSS12 20MSS13", "2403717672622001 O"],
            Some("page2.png") => &["A+", "B"],
            _ => bail!("unreadable image"),
        };
        Ok(lines.iter().map(|line| line.to_string()).collect())
    }
}

#[test]
fn convert_joins_lines_across_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    let images = dir.path().join("scans");
    fs::create_dir_all(&images).expect("mkdir");
    for name in ["page1.png", "page2.png", "smudged.png"] {
        fs::write(images.join(name), name.as_bytes()).expect("write image");
    }

    let args = ConvertArgs {
        inputs: vec![images.clone()],
        output: dir.path().join("extracted_table.csv"),
        transcript: Some(dir.path().join("ocr_output.txt")),
        engine: OcrEngineArgs {
            tesseract_bin: "tesseract".to_string(),
            ocr_lang: "eng".to_string(),
            psm: 6,
        },
        table: table_args(dir.path()),
    };

    super::convert::convert_with_engine(&PagedEngine, &args).expect("convert");

    let table = parse_csv_table(&fs::read_to_string(&args.output).expect("csv")).expect("parse");
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].grades, vec!["O", "A+", "B"]);

    let transcript = fs::read_to_string(dir.path().join("ocr_output.txt")).expect("transcript");
    assert!(transcript.contains("=== page2.png ===\nA+\nB\n"));
    assert!(!transcript.contains("smudged.png"));

    let report = read_json(&dir.path().join("report.json"));
    assert_eq!(report["ocr_engine"]["name"], "paged");
    assert_eq!(report["ocr_engine"]["version"], "paged 1.0");
    assert_eq!(report["inputs"].as_array().map(Vec::len), Some(2));
    assert!(
        report["command"]
            .as_str()
            .unwrap_or_default()
            .starts_with("gradesheet convert")
    );
}

#[test]
fn grade_summary_counts_per_subject() {
    let table = ExtractedTable {
        columns: vec!["20MSS11".to_string(), "20MSS12".to_string()],
        rows: vec![
            Row {
                register_number: "2403717672622001".to_string(),
                grades: vec!["O".to_string(), "A".to_string()],
            },
            Row {
                register_number: "2403717672622002".to_string(),
                grades: vec!["O".to_string(), "B+".to_string()],
            },
        ],
    };

    assert_eq!(
        super::inspect::render_grade_summary(&table),
        "Rows: 2\n20MSS11: O=2\n20MSS12: A=1 B+=1\n"
    );
}

#[test]
fn inspect_reads_exported_table() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path: PathBuf = dir.path().join("table.csv");
    fs::write(&path, "Register No.,20MSS11,20MSS12,20MSS13\n2403717672622001,O,A,B\n")
        .expect("write");

    super::inspect::run(crate::cli::InspectArgs { table: path }).expect("inspect");
}
