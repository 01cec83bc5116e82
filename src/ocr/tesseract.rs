use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};

use super::OcrEngine;

/// OCR through the `tesseract` command-line binary.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    program: String,
    lang: String,
    psm: u8,
}

impl TesseractEngine {
    pub fn new(program: impl Into<String>, lang: impl Into<String>, psm: u8) -> Self {
        Self {
            program: program.into(),
            lang: lang.into(),
            psm,
        }
    }

    pub fn ensure_available(&self) -> Result<()> {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .with_context(|| format!("failed to execute {}; is tesseract installed?", self.program))?;
        Ok(())
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn version(&self) -> Option<String> {
        let output = Command::new(&self.program).arg("--version").output().ok()?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let source = if stdout.trim().is_empty() {
            stderr.trim()
        } else {
            stdout.trim()
        };

        source
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.to_string())
    }

    fn recognize(&self, image: &Path) -> Result<Vec<String>> {
        if !image.is_file() {
            bail!("image not found: {}", image.display());
        }

        let output = Command::new(&self.program)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .arg("--psm")
            .arg(self.psm.to_string())
            .output()
            .with_context(|| format!("failed to execute tesseract for {}", image.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "tesseract returned non-zero exit status for {}: {}",
                image.display(),
                stderr.trim()
            );
        }

        Ok(split_recognized_text(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }
}

/// Tesseract separates blocks with blank lines and ends pages with a form
/// feed; neither carries table content.
fn split_recognized_text(raw: &str) -> Vec<String> {
    raw.replace(['\u{0000}', '\u{000C}'], "")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<&str>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}
