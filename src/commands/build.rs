use anyhow::Result;
use tracing::info;

use crate::cli::BuildArgs;
use crate::commands::{load, load_catalog, merge, parse, render};
use crate::util::ContentLayout;

pub fn run(args: BuildArgs) -> Result<()> {
    let catalog = load_catalog(&args.catalog)?;
    let layout = ContentLayout::new(&args.content_root);
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| layout.default_db_path());

    let manifest = parse::parse_catalog(&layout, &catalog, &[], args.max_line_bytes)?;
    let rendered = render::render_directory(&layout.canonical_dir(), &layout.html_dir())?;
    let merged = merge::merge_directory(&layout, args.max_key_chars)?;
    let counts = load::load_database(&layout, &db_path)?;

    info!(
        parsed = manifest.sources.len(),
        rendered,
        words = merged.index.len(),
        skipped_keys = merged.skipped_keys,
        dictionaries = counts.dictionaries,
        db = %db_path.display(),
        "build completed"
    );
    Ok(())
}
