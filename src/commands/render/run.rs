use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tracing::info;

use crate::cli::RenderArgs;
use crate::model::{
    CanonicalDictionary, DictFormat, PlainTextDictionary, StructuredDictionary,
};
use crate::util::{
    ContentLayout, ensure_directory, file_name_string, list_json_files, write_stage_json,
};

use super::HtmlRenderer;

#[derive(Debug, Deserialize)]
struct FormatProbe {
    format: u8,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let layout = ContentLayout::new(&args.content_root);
    render_directory(&layout.canonical_dir(), &layout.html_dir())?;
    Ok(())
}

/// Reads a phase-02 file: the `format` discriminant first, then the body in
/// the matching shape.
pub(crate) fn decode_canonical(raw: &[u8]) -> Result<CanonicalDictionary> {
    let probe: FormatProbe =
        serde_json::from_slice(raw).context("failed to read format discriminant")?;
    let format = DictFormat::try_from(probe.format).map_err(|err| anyhow!(err))?;

    let dictionary = match format {
        DictFormat::Html => CanonicalDictionary::Html(
            serde_json::from_slice::<PlainTextDictionary>(raw)
                .context("failed to decode html dictionary")?,
        ),
        DictFormat::Plain => CanonicalDictionary::Plain(
            serde_json::from_slice::<PlainTextDictionary>(raw)
                .context("failed to decode plain-text dictionary")?,
        ),
        DictFormat::Json => CanonicalDictionary::Json(
            serde_json::from_slice::<StructuredDictionary>(raw)
                .context("failed to decode structured dictionary")?,
        ),
    };

    Ok(dictionary)
}

pub(crate) fn read_canonical(path: &Path) -> Result<CanonicalDictionary> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    decode_canonical(&raw).with_context(|| format!("failed to decode {}", path.display()))
}

/// Renders every phase-02 file in `source_dir` into `output_dir` under the
/// same file name.
pub(crate) fn render_directory(source_dir: &Path, output_dir: &Path) -> Result<usize> {
    ensure_directory(output_dir)?;
    let renderer = HtmlRenderer::new()?;
    let files = list_json_files(source_dir)?;

    for path in &files {
        let canonical = read_canonical(path)?;
        let format = canonical.format();
        let dictionary = renderer.unify(canonical);

        let output = output_dir.join(file_name_string(path));
        write_stage_json(&output, &dictionary)?;
        info!(
            file = %file_name_string(path),
            format = %format,
            headwords = dictionary.words_to_html_map.len(),
            "rendered dictionary"
        );
    }

    info!(
        source = %source_dir.display(),
        output = %output_dir.display(),
        files = files.len(),
        "render complete"
    );
    Ok(files.len())
}
