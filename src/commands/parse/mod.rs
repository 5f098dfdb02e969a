use std::path::Path;

use anyhow::Result;

use crate::model::{SourceBinding, Strategy};

mod capitalized;
mod colon_delimited;
mod line_scan;
mod numbering;
mod run;
mod single_line;
mod structured_json;
#[cfg(test)]
mod tests;

pub use run::run;
pub(crate) use run::parse_catalog;

use capitalized::*;
use colon_delimited::*;
use line_scan::*;
use single_line::*;
use structured_json::*;

/// Runs the strategy bound to `binding` over the file at `path`.
pub(crate) fn parse_source(
    binding: &SourceBinding,
    path: &Path,
    max_line_bytes: usize,
) -> Result<ParsedSource> {
    match binding.strategy {
        Strategy::ColonDelimited | Strategy::ColonArabic | Strategy::ColonMultiKey => {
            run_parser(path, max_line_bytes, ColonDelimitedParser::new(binding))
        }
        Strategy::StructuredSimple | Strategy::StructuredRich => {
            run_parser(path, max_line_bytes, StructuredJsonParser::new(binding))
        }
        Strategy::CapitalizedExplanatory
        | Strategy::CapitalizedTurkish
        | Strategy::CapitalizedOcr => {
            run_parser(path, max_line_bytes, CapitalizedParser::new(binding)?)
        }
        Strategy::SingleLine => run_parser(path, max_line_bytes, SingleLineParser::new(binding)),
    }
}
