use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::cli::LoadArgs;
use crate::model::{DictionaryInfo, MergedIndex};
use crate::util::{ContentLayout, read_json};

use super::{DictionarySink, SqliteSink};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LoadCounts {
    pub(crate) dictionaries: usize,
    pub(crate) words: usize,
}

pub fn run(args: LoadArgs) -> Result<()> {
    let layout = ContentLayout::new(&args.content_root);
    let db_path = args
        .db_path
        .clone()
        .unwrap_or_else(|| layout.default_db_path());
    load_database(&layout, &db_path)?;
    Ok(())
}

/// Rebuilds the SQLite database at `db_path` from the phase-04 documents.
pub(crate) fn load_database(layout: &ContentLayout, db_path: &Path) -> Result<LoadCounts> {
    let index: MergedIndex = read_json(&layout.merged_index_path())?;
    let registry: Vec<DictionaryInfo> = read_json(&layout.registry_path())?;

    let mut sink = SqliteSink::create(db_path)?;
    let counts = load_into(&mut sink, &registry, &index)?;
    sink.close()?;

    info!(
        path = %db_path.display(),
        dictionaries = counts.dictionaries,
        words = counts.words,
        "database loaded"
    );
    Ok(counts)
}

pub(crate) fn load_into(
    sink: &mut impl DictionarySink,
    registry: &[DictionaryInfo],
    index: &MergedIndex,
) -> Result<LoadCounts> {
    let dictionaries = sink.load_dictionaries(registry)?;
    let words = sink.load_words(index)?;
    Ok(LoadCounts {
        dictionaries,
        words,
    })
}
