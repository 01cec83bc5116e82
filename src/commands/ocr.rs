use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::{OcrArgs, OcrEngineArgs};
use crate::ocr::{
    OcrEngine, OcrSource, TesseractEngine, collect_image_paths, recognize_images,
    render_transcript,
};
use crate::util::ensure_directory;

pub fn run(args: OcrArgs) -> Result<()> {
    let engine = build_engine(&args.engine)?;
    let sources = recognize_inputs(&engine, &args.inputs)?;
    write_transcript(&args.output, &sources)
}

pub(crate) fn build_engine(args: &OcrEngineArgs) -> Result<TesseractEngine> {
    let engine = TesseractEngine::new(args.tesseract_bin.clone(), args.ocr_lang.clone(), args.psm);
    engine.ensure_available()?;
    info!(
        engine = engine.name(),
        version = %engine.version().unwrap_or_default(),
        lang = %args.ocr_lang,
        psm = args.psm,
        "ocr engine ready"
    );
    Ok(engine)
}

pub(crate) fn recognize_inputs<E: OcrEngine + ?Sized>(
    engine: &E,
    inputs: &[PathBuf],
) -> Result<Vec<OcrSource>> {
    let images = collect_image_paths(inputs)?;
    info!(images = images.len(), "running ocr");
    recognize_images(engine, &images)
}

pub(crate) fn write_transcript(path: &Path, sources: &[OcrSource]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    fs::write(path, render_transcript(sources))
        .with_context(|| format!("failed to write transcript {}", path.display()))?;

    info!(
        path = %path.display(),
        sources = sources.len(),
        lines = sources.iter().map(|source| source.lines.len()).sum::<usize>(),
        "wrote ocr transcript"
    );
    Ok(())
}
