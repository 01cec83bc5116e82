use super::OcrSource;

const DEFAULT_SOURCE_NAME: &str = "transcript";

/// Combined OCR text: each source under a `=== name ===` header, followed by
/// a blank line.
pub fn render_transcript(sources: &[OcrSource]) -> String {
    let mut out = String::new();
    for source in sources {
        out.push_str(&format!("=== {} ===\n", source.name));
        for line in &source.lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Splits a transcript back into its sources. Lines are trimmed and blank
/// lines dropped; text before the first header (or a file with no headers at
/// all) becomes a source named `fallback_name`.
pub fn parse_transcript(text: &str, fallback_name: Option<&str>) -> Vec<OcrSource> {
    let mut sources = Vec::<OcrSource>::new();
    let mut current: Option<OcrSource> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if let Some(name) = section_header(line) {
            if let Some(done) = current.take() {
                sources.push(done);
            }
            current = Some(OcrSource {
                name: name.to_string(),
                path: None,
                lines: Vec::new(),
            });
            continue;
        }

        if line.is_empty() {
            continue;
        }

        current
            .get_or_insert_with(|| OcrSource {
                name: fallback_name.unwrap_or(DEFAULT_SOURCE_NAME).to_string(),
                path: None,
                lines: Vec::new(),
            })
            .lines
            .push(line.to_string());
    }

    if let Some(done) = current {
        sources.push(done);
    }

    sources
}

fn section_header(line: &str) -> Option<&str> {
    let name = line.strip_prefix("=== ")?.strip_suffix(" ===")?.trim();
    (!name.is_empty()).then_some(name)
}

/// Every source's lines in order, as one sequence.
pub fn all_lines(sources: &[OcrSource]) -> Vec<String> {
    sources
        .iter()
        .flat_map(|source| source.lines.iter().cloned())
        .collect()
}
