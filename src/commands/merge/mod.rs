mod index;
mod run;

pub use run::run;
pub(crate) use run::merge_directory;

use index::*;
