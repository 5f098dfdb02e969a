use std::path::Path;

use anyhow::{Result, bail};
use chrono::Utc;
use tracing::{info, warn};

use crate::cli::ParseArgs;
use crate::commands::load_catalog;
use crate::model::{CanonicalDictionary, Catalog, ParseRunManifest, SourceRunSummary};
use crate::util::{
    ContentLayout, ensure_directory, now_utc_string, sha256_file, utc_compact_string,
    write_json_pretty, write_stage_json,
};

use super::parse_source;

const MANIFEST_VERSION: u32 = 1;

pub fn run(args: ParseArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let layout = ContentLayout::new(&args.content_root);
    parse_catalog(&layout, &catalog, &args.sources, args.max_line_bytes)?;
    Ok(())
}

/// Parses every selected binding from the raw directory into the canonical
/// directory and records a run manifest.
pub(crate) fn parse_catalog(
    layout: &ContentLayout,
    catalog: &Catalog,
    sources: &[String],
    max_line_bytes: usize,
) -> Result<ParseRunManifest> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let raw_dir = layout.raw_dir();
    let output_dir = layout.canonical_dir();
    ensure_directory(&output_dir)?;

    let bindings = catalog.select(sources)?;
    info!(run_id = %run_id, sources = bindings.len(), "parse started");

    let mut summaries = Vec::with_capacity(bindings.len());
    for binding in bindings {
        let input = raw_dir.join(&binding.file);
        if !input.is_file() {
            bail!("raw source missing: {}", input.display());
        }

        let sha256 = sha256_file(&input)?;
        let parsed = parse_source(binding, &input, max_line_bytes)?;

        if !parsed.diagnostics.is_empty() {
            warn!(
                file = %binding.file,
                count = parsed.diagnostics.len(),
                "lines skipped during parse"
            );
            for diagnostic in &parsed.diagnostics {
                warn!(file = %binding.file, "{diagnostic}");
            }
        }

        let output = output_dir.join(binding.output_file_name());
        write_canonical(&output, &parsed.dictionary)?;

        let headword_count = parsed.dictionary.headword_count();
        info!(
            file = %binding.file,
            strategy = binding.strategy.as_str(),
            format = %parsed.dictionary.format(),
            headwords = headword_count,
            output = %output.display(),
            "parsed source"
        );

        summaries.push(SourceRunSummary {
            file: binding.file.clone(),
            id: binding.id,
            strategy: binding.strategy.as_str().to_string(),
            format: parsed.dictionary.format().as_str().to_string(),
            sha256,
            headword_count,
            diagnostic_count: parsed.diagnostics.len(),
        });
    }

    let manifest = ParseRunManifest {
        manifest_version: MANIFEST_VERSION,
        run_id,
        started_at,
        completed_at: now_utc_string(),
        raw_dir: raw_dir.display().to_string(),
        output_dir: output_dir.display().to_string(),
        max_line_bytes,
        sources: summaries,
    };

    let manifest_path = layout
        .manifest_dir()
        .join(format!("parse_run_{}.json", utc_compact_string(started_ts)));
    write_json_pretty(&manifest_path, &manifest)?;
    info!(
        path = %manifest_path.display(),
        sources = manifest.sources.len(),
        "wrote parse run manifest"
    );

    Ok(manifest)
}

pub(crate) fn write_canonical(path: &Path, dictionary: &CanonicalDictionary) -> Result<()> {
    match dictionary {
        CanonicalDictionary::Html(dict) | CanonicalDictionary::Plain(dict) => {
            write_stage_json(path, dict)
        }
        CanonicalDictionary::Json(dict) => write_stage_json(path, dict),
    }
}
