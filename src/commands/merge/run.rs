use anyhow::Result;
use tracing::info;

use crate::cli::MergeArgs;
use crate::model::HtmlDictionary;
use crate::util::{ContentLayout, file_name_string, list_json_files, read_json, write_stage_json};

use super::{IndexMerger, MergeOutput};

pub fn run(args: MergeArgs) -> Result<()> {
    let layout = ContentLayout::new(&args.content_root);
    merge_directory(&layout, args.max_key_chars)?;
    Ok(())
}

/// Merges every phase-03 file, in file-name order, and writes the index and
/// registry documents.
pub(crate) fn merge_directory(layout: &ContentLayout, max_key_chars: usize) -> Result<MergeOutput> {
    let mut merger = IndexMerger::new(max_key_chars);

    for path in list_json_files(&layout.html_dir())? {
        let dictionary: HtmlDictionary = read_json(&path)?;
        info!(
            file = %file_name_string(&path),
            words = dictionary.words_to_html_map.len(),
            "merging dictionary"
        );
        merger.add(dictionary);
    }

    let output = merger.finish();

    let index_path = layout.merged_index_path();
    write_stage_json(&index_path, &output.index)?;
    let registry_path = layout.registry_path();
    write_stage_json(&registry_path, &output.registry)?;

    info!(
        index = %index_path.display(),
        registry = %registry_path.display(),
        words = output.index.len(),
        dictionaries = output.registry.len(),
        skipped_keys = output.skipped_keys,
        "merge complete"
    );
    Ok(output)
}
