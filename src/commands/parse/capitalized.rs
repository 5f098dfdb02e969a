use anyhow::{Context, Result};
use regex::Regex;

use crate::model::{CanonicalDictionary, PlainTextDictionary, SourceBinding, Strategy};
use crate::text::{
    is_fully_capitalized, normalize_palochka, starts_with_ascii_digit,
    starts_with_special_character, strip_zero_width, to_lower, trim_trailing_punctuation,
};

use super::line_scan::{LineParser, ParsedSource};
use super::numbering::NumberingStyle;

/// Per-strategy knobs of the capitalization-delimited parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CapitalizedPreset {
    pub(crate) detect_on_normalized: bool,
    pub(crate) collapse_spaced_capitals: bool,
    pub(crate) reject_range_headers: bool,
    pub(crate) reject_digit_start: bool,
    pub(crate) normalize_key: bool,
    pub(crate) numbering: NumberingStyle,
}

impl CapitalizedPreset {
    pub(crate) fn for_strategy(strategy: Strategy) -> Self {
        match strategy {
            Strategy::CapitalizedTurkish => Self {
                detect_on_normalized: false,
                collapse_spaced_capitals: false,
                reject_range_headers: true,
                reject_digit_start: true,
                normalize_key: false,
                numbering: NumberingStyle::DotsAndParens,
            },
            Strategy::CapitalizedOcr => Self {
                detect_on_normalized: false,
                collapse_spaced_capitals: true,
                reject_range_headers: false,
                reject_digit_start: false,
                normalize_key: true,
                numbering: NumberingStyle::DotsStartAware,
            },
            _ => Self {
                detect_on_normalized: true,
                collapse_spaced_capitals: false,
                reject_range_headers: false,
                reject_digit_start: false,
                normalize_key: true,
                numbering: NumberingStyle::DotsStartAware,
            },
        }
    }
}

/// Running state of the left-to-right scan.
#[derive(Debug, Default)]
pub(crate) enum EntryAccumulator {
    #[default]
    Idle,
    Accumulating { headword: String, buffer: String },
}

impl EntryAccumulator {
    /// Starts a new entry and hands back the one it replaces, if any.
    pub(crate) fn start(&mut self, headword: String, line: String) -> Option<(String, String)> {
        let previous = self.take();
        *self = Self::Accumulating {
            headword,
            buffer: line,
        };
        previous
    }

    /// Appends a continuation line. Returns false when no entry is open.
    pub(crate) fn extend(&mut self, line: &str) -> bool {
        match self {
            Self::Idle => false,
            Self::Accumulating { buffer, .. } => {
                if !buffer.is_empty() {
                    buffer.push(' ');
                }
                buffer.push_str(line);
                true
            }
        }
    }

    pub(crate) fn take(&mut self) -> Option<(String, String)> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Accumulating { headword, buffer } => Some((headword, buffer)),
        }
    }
}

/// Prose sources where a fully capitalized first token opens a new entry.
#[derive(Debug)]
pub(crate) struct CapitalizedParser {
    preset: CapitalizedPreset,
    spaced_capitals: Regex,
    accumulator: EntryAccumulator,
    dictionary: PlainTextDictionary,
    diagnostics: Vec<String>,
}

impl CapitalizedParser {
    pub(crate) fn new(binding: &SourceBinding) -> Result<Self> {
        Ok(Self {
            preset: CapitalizedPreset::for_strategy(binding.strategy),
            spaced_capitals: Regex::new(r"([А-ЯЁI])\s+([А-ЯЁI])")
                .context("failed to compile spaced capitals regex")?,
            accumulator: EntryAccumulator::default(),
            dictionary: PlainTextDictionary::new(binding, binding.output_format()),
            diagnostics: Vec::new(),
        })
    }

    /// Joins spaced-out uppercase letters (`А Б А Д З Э` -> `АБАДЗЭ`) until
    /// nothing changes.
    pub(crate) fn collapse_spaced_capitals(&self, line: &str) -> String {
        let mut current = line.to_string();
        loop {
            let next = self
                .spaced_capitals
                .replace_all(&current, "$1$2")
                .into_owned();
            if next == current {
                return current;
            }
            current = next;
        }
    }

    fn is_entry_boundary(&self, token: &str) -> bool {
        is_fully_capitalized(token)
            && !starts_with_special_character(token)
            && !(self.preset.reject_digit_start && starts_with_ascii_digit(token))
    }

    fn flush(&mut self, key: String, buffer: String) {
        let mut headword = to_lower(&key);
        if self.preset.normalize_key {
            headword = normalize_palochka(&headword);
        } else {
            headword = headword.trim_matches(':').to_string();
        }
        if headword.is_empty() {
            return;
        }
        self.dictionary.append(headword, normalize_palochka(&buffer));
    }
}

impl LineParser for CapitalizedParser {
    fn feed(&mut self, line_number: usize, line: &str) {
        let mut text = strip_zero_width(line.trim()).trim().to_string();
        if self.preset.collapse_spaced_capitals {
            text = self.collapse_spaced_capitals(&text).trim().to_string();
        }
        if text.is_empty() {
            return;
        }

        let detection = if self.preset.detect_on_normalized {
            normalize_palochka(&text)
        } else {
            text.clone()
        };
        let tokens = detection.split_whitespace().collect::<Vec<&str>>();
        let Some(first) = tokens.first() else {
            return;
        };

        if self.preset.reject_range_headers
            && tokens.len() == 1
            && first.chars().count() == 3
            && first.contains('-')
        {
            self.diagnostics
                .push(format!("range header on line {line_number}: {first}"));
            return;
        }

        let formatted = self.preset.numbering.apply(&text);
        let candidate = trim_trailing_punctuation(first);

        if self.is_entry_boundary(candidate) {
            if let Some((key, buffer)) = self.accumulator.start(candidate.to_string(), formatted) {
                self.flush(key, buffer);
            }
        } else if !self.accumulator.extend(&formatted) {
            self.diagnostics
                .push(format!("text before the first headword on line {line_number}: {text}"));
        }
    }

    fn finish(mut self) -> ParsedSource {
        if let Some((key, buffer)) = self.accumulator.take() {
            self.flush(key, buffer);
        }
        ParsedSource {
            dictionary: CanonicalDictionary::from_plain_text(self.dictionary),
            diagnostics: self.diagnostics,
        }
    }
}
