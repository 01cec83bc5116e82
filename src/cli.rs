use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "gradesheet",
    version,
    about = "Rebuild grade-sheet tables from OCR'd mark-sheet scans"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run OCR over mark-sheet images and save the combined transcript.
    Ocr(OcrArgs),
    /// Rebuild the grade table from a saved OCR transcript.
    Extract(ExtractArgs),
    /// OCR images and rebuild the grade table in one step.
    Convert(ConvertArgs),
    /// Summarise grades per subject in an exported CSV table.
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct OcrEngineArgs {
    #[arg(long, default_value = "tesseract")]
    pub tesseract_bin: String,

    #[arg(long, default_value = "eng")]
    pub ocr_lang: String,

    /// Tesseract page segmentation mode.
    #[arg(long, default_value_t = 6)]
    pub psm: u8,
}

#[derive(Args, Debug, Clone)]
pub struct TableArgs {
    /// Keep register numbers exactly as read, skipping the leading-1 fix.
    #[arg(long, default_value_t = false)]
    pub keep_register_order: bool,

    /// Also write the table as JSON.
    #[arg(long)]
    pub json_path: Option<PathBuf>,

    /// Write a run report (inputs, hashes, counts, outcome).
    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct OcrArgs {
    /// Image files or directories of images.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long, default_value = "ocr_output.txt")]
    pub output: PathBuf,

    #[command(flatten)]
    pub engine: OcrEngineArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long, default_value = "ocr_output.txt")]
    pub transcript: PathBuf,

    /// CSV destination; stdout when omitted. A directory with `--per-source`.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Extract each transcript section independently.
    #[arg(long, default_value_t = false)]
    pub per_source: bool,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Image files or directories of images.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long, default_value = "extracted_table.csv")]
    pub output: PathBuf,

    /// Also save the OCR transcript here.
    #[arg(long)]
    pub transcript: Option<PathBuf>,

    #[command(flatten)]
    pub engine: OcrEngineArgs,

    #[command(flatten)]
    pub table: TableArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[arg(default_value = "extracted_table.csv")]
    pub table: PathBuf,
}

impl TableArgs {
    pub fn extract_options(&self) -> crate::table::ExtractOptions {
        crate::table::ExtractOptions {
            fix_misaligned_registers: !self.keep_register_order,
        }
    }
}
