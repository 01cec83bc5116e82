use anyhow::Result;

use super::extract::extract_combined;
use super::ocr::{build_engine, recognize_inputs, write_transcript};
use super::output::{input_file, write_report};
use crate::cli::ConvertArgs;
use crate::model::OcrEngineInfo;
use crate::ocr::{OcrEngine, all_lines};

pub fn run(args: ConvertArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    convert_with_engine(&engine, &args)
}

/// OCR followed by extraction over the lines of every image, in input order.
pub(crate) fn convert_with_engine<E: OcrEngine + ?Sized>(
    engine: &E,
    args: &ConvertArgs,
) -> Result<()> {
    let sources = recognize_inputs(engine, &args.inputs)?;

    if let Some(path) = &args.transcript {
        write_transcript(path, &sources)?;
    }

    let (extractions, outcome) = extract_combined(
        &all_lines(&sources),
        &args.table.extract_options(),
        Some(&args.output),
        args.table.json_path.as_deref(),
    );

    if let Some(report_path) = &args.table.report_path {
        let inputs = sources
            .iter()
            .filter_map(|source| source.path.as_deref())
            .map(input_file)
            .collect::<Result<Vec<_>>>()?;

        write_report(
            report_path,
            render_convert_command(args),
            Some(OcrEngineInfo {
                name: engine.name().to_string(),
                version: engine.version(),
            }),
            inputs,
            extractions,
        )?;
    }

    outcome
}

fn render_convert_command(args: &ConvertArgs) -> String {
    let mut command = vec!["gradesheet".to_string(), "convert".to_string()];
    command.extend(args.inputs.iter().map(|path| path.display().to_string()));
    command.push("--output".to_string());
    command.push(args.output.display().to_string());

    if let Some(path) = &args.transcript {
        command.push("--transcript".to_string());
        command.push(path.display().to_string());
    }
    command.push("--ocr-lang".to_string());
    command.push(args.engine.ocr_lang.clone());
    command.push("--psm".to_string());
    command.push(args.engine.psm.to_string());
    if args.table.keep_register_order {
        command.push("--keep-register-order".to_string());
    }

    command.join(" ")
}
