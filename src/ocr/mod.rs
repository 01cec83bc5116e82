//! OCR collaborator: turns mark-sheet images into ordered text lines.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

mod tesseract;
mod transcript;

pub use tesseract::TesseractEngine;
pub use transcript::{all_lines, parse_transcript, render_transcript};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff"];

pub trait OcrEngine {
    fn name(&self) -> &str;

    fn version(&self) -> Option<String>;

    /// Recognised text of one image, one entry per detected line.
    fn recognize(&self, image: &Path) -> Result<Vec<String>>;
}

/// Lines recognised from one input image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSource {
    pub name: String,
    pub path: Option<PathBuf>,
    pub lines: Vec<String>,
}

/// Expands directories to the images they directly contain, sorted by path.
pub fn collect_image_paths(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            let entries = fs::read_dir(input)
                .with_context(|| format!("failed to read {}", input.display()))?;
            for entry in entries {
                let entry =
                    entry.with_context(|| format!("failed to read entry in {}", input.display()))?;
                let path = entry.path();
                if path.is_file() && is_supported_image(&path) {
                    found.push(path);
                }
            }
            found.sort();
            images.extend(found);
        } else if is_supported_image(input) {
            images.push(input.clone());
        } else {
            warn!(path = %input.display(), "skipping unsupported input");
        }
    }

    if images.is_empty() {
        bail!("no supported images (jpg, jpeg, png, tif, tiff) among the inputs");
    }

    Ok(images)
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// Runs `engine` over each image in order. Images that fail recognition are
/// logged and skipped; the batch fails only when nothing was recognised.
pub fn recognize_images<E: OcrEngine + ?Sized>(
    engine: &E,
    images: &[PathBuf],
) -> Result<Vec<OcrSource>> {
    let mut sources = Vec::with_capacity(images.len());

    for image in images {
        let name = image
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| image.display().to_string());

        match engine.recognize(image) {
            Ok(lines) => {
                info!(image = %name, lines = lines.len(), engine = engine.name(), "ocr complete");
                sources.push(OcrSource {
                    name,
                    path: Some(image.clone()),
                    lines,
                });
            }
            Err(err) => {
                warn!(image = %name, error = %err, "could not read image");
            }
        }
    }

    if sources.is_empty() {
        bail!("ocr failed for every input image");
    }

    Ok(sources)
}
