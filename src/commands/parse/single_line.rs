use crate::model::{CanonicalDictionary, PlainTextDictionary, SourceBinding};
use crate::text::{normalize_palochka, strip_zero_width, to_lower};

use super::line_scan::{LineParser, ParsedSource};
use super::numbering::NumberingStyle;

/// Every line is a whole entry keyed by its first token.
#[derive(Debug)]
pub(crate) struct SingleLineParser {
    normalize_key: bool,
    dictionary: PlainTextDictionary,
}

impl SingleLineParser {
    pub(crate) fn new(binding: &SourceBinding) -> Self {
        Self {
            normalize_key: binding.source_is_circassian(),
            dictionary: PlainTextDictionary::new(binding, binding.output_format()),
        }
    }
}

impl LineParser for SingleLineParser {
    fn feed(&mut self, _line_number: usize, line: &str) {
        let text = strip_zero_width(line.trim()).trim();
        let Some(first) = text.split_whitespace().next() else {
            return;
        };

        let mut headword = to_lower(first);
        if self.normalize_key {
            headword = normalize_palochka(&headword);
        }

        let value = normalize_palochka(&NumberingStyle::DotsAndParens.apply(text));
        self.dictionary.append(headword, value);
    }

    fn finish(self) -> ParsedSource {
        ParsedSource {
            dictionary: CanonicalDictionary::from_plain_text(self.dictionary),
            diagnostics: Vec::new(),
        }
    }
}
