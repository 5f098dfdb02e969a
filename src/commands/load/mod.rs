use anyhow::Result;

use crate::model::{DictionaryInfo, MergedIndex};

mod db_setup;
mod run;

pub use run::run;
pub(crate) use run::load_database;

use db_setup::*;

/// Destination of the merged index and its dictionary registry.
pub(crate) trait DictionarySink {
    fn load_dictionaries(&mut self, dictionaries: &[DictionaryInfo]) -> Result<usize>;

    fn load_words(&mut self, index: &MergedIndex) -> Result<usize>;
}
