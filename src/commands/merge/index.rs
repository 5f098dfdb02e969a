use std::collections::HashSet;

use tracing::{debug, warn};

use crate::model::{DictionaryInfo, HtmlDictionary, MergedEntry, MergedIndex};

#[derive(Debug, Default)]
pub(crate) struct MergeOutput {
    pub(crate) index: MergedIndex,
    pub(crate) registry: Vec<DictionaryInfo>,
    pub(crate) skipped_keys: usize,
}

/// Folds HTML dictionaries, in the order given, into one headword index and
/// the registry of distinct source ids.
#[derive(Debug)]
pub(crate) struct IndexMerger {
    max_key_chars: usize,
    seen_ids: HashSet<u32>,
    output: MergeOutput,
}

impl IndexMerger {
    pub(crate) fn new(max_key_chars: usize) -> Self {
        Self {
            max_key_chars,
            seen_ids: HashSet::new(),
            output: MergeOutput::default(),
        }
    }

    pub(crate) fn add(&mut self, dictionary: HtmlDictionary) {
        if self.seen_ids.insert(dictionary.id) {
            self.output.registry.push(DictionaryInfo {
                id: dictionary.id,
                title: dictionary.title.clone(),
                from_lang: dictionary.from_lang.clone(),
                to_lang: dictionary.to_lang.clone(),
            });
        } else {
            warn!(
                id = dictionary.id,
                title = %dictionary.title,
                "dictionary id already registered"
            );
        }

        for (headword, fragments) in dictionary.words_to_html_map {
            let chars = headword.chars().count();
            if chars > self.max_key_chars {
                debug!(chars, headword = %headword, "skipping long key");
                self.output.skipped_keys += 1;
                continue;
            }

            self.output
                .index
                .entry(headword)
                .or_default()
                .push(MergedEntry {
                    id: dictionary.id,
                    html: fragments.concat(),
                });
        }
    }

    pub(crate) fn finish(self) -> MergeOutput {
        self.output
    }
}
