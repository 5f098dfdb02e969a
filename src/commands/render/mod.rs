mod html;
mod run;

pub use run::run;
pub(crate) use run::render_directory;

use html::*;
