use crate::model::{CanonicalDictionary, PlainTextDictionary, SourceBinding, Strategy};
use crate::text::{collapse_whitespace, normalize_palochka, to_lower};

use super::line_scan::{LineParser, ParsedSource, invalid_line};

/// Wrapper markup stripped from Arabic-script values when a binding does not
/// list its own. The sources carry it JSON-escaped, backslashes included.
pub(crate) const DEFAULT_ARABIC_MARKUP: [&str; 2] = [r#"<div style=\"margin-left:1em\">"#, "</div>"];

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ColonLine<'a> {
    Skip,
    Invalid,
    Entry { key: &'a str, value: &'a str },
}

/// Splits a `"key": "value",` line on its first colon. Blank lines, bare
/// braces and empty keys are skipped.
pub(crate) fn split_colon_line(line: &str) -> ColonLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed == "{" || trimmed == "}" {
        return ColonLine::Skip;
    }

    let Some((raw_key, value)) = trimmed.split_once(':') else {
        return ColonLine::Invalid;
    };

    let key = raw_key.trim().trim_matches('"');
    if key.is_empty() {
        return ColonLine::Skip;
    }

    ColonLine::Entry { key, value }
}

fn unquote_value(value: &str) -> &str {
    let value = value.trim();
    value.strip_suffix(',').unwrap_or(value).trim_matches('"')
}

/// Expands a slash-separated key into its variant spellings.
///
/// `"Prefix A / B"` gives `["Prefix A", "Prefix B"]` and `"A / B Suffix"`
/// gives `["A Suffix", "B Suffix"]`. Any other shape yields the trimmed
/// parts as they are.
pub(crate) fn expand_key(key: &str) -> Vec<String> {
    if !key.contains('/') {
        return vec![key.to_string()];
    }

    let parts = key.split('/').map(str::trim).collect::<Vec<&str>>();

    if let [first, second] = parts.as_slice() {
        let first_tokens = first.split_whitespace().collect::<Vec<&str>>();
        let second_tokens = second.split_whitespace().collect::<Vec<&str>>();

        if first_tokens.len() > 1 && second_tokens.len() == 1 {
            let prefix = first_tokens[..first_tokens.len() - 1].join(" ");
            return vec![first.to_string(), format!("{prefix} {second}")];
        }

        if first_tokens.len() == 1 && second_tokens.len() > 1 {
            let suffix = second_tokens[1..].join(" ");
            return vec![format!("{first} {suffix}"), second.to_string()];
        }
    }

    parts.into_iter().map(str::to_string).collect()
}

#[derive(Debug)]
enum ColonVariant {
    Standard,
    Arabic { strip_markup: Vec<String> },
    MultiKey,
}

/// `key: value` sources, including the Arabic and slash-variant shapes.
#[derive(Debug)]
pub(crate) struct ColonDelimitedParser {
    variant: ColonVariant,
    dictionary: PlainTextDictionary,
    diagnostics: Vec<String>,
}

impl ColonDelimitedParser {
    pub(crate) fn new(binding: &SourceBinding) -> Self {
        let variant = match binding.strategy {
            Strategy::ColonArabic => {
                let strip_markup = if binding.strip_markup.is_empty() {
                    DEFAULT_ARABIC_MARKUP.iter().map(|s| s.to_string()).collect()
                } else {
                    binding.strip_markup.clone()
                };
                ColonVariant::Arabic { strip_markup }
            }
            Strategy::ColonMultiKey => ColonVariant::MultiKey,
            _ => ColonVariant::Standard,
        };

        Self {
            variant,
            dictionary: PlainTextDictionary::new(binding, binding.output_format()),
            diagnostics: Vec::new(),
        }
    }

    fn headword(key: &str) -> String {
        normalize_palochka(&to_lower(key))
    }
}

impl LineParser for ColonDelimitedParser {
    fn feed(&mut self, line_number: usize, line: &str) {
        let (key, raw_value) = match split_colon_line(line) {
            ColonLine::Skip => return,
            ColonLine::Invalid => {
                self.diagnostics.push(invalid_line(line_number, line.trim()));
                return;
            }
            ColonLine::Entry { key, value } => (key, unquote_value(value)),
        };

        match &self.variant {
            ColonVariant::Standard => {
                let value = normalize_palochka(&raw_value.replace("\\\"", "\""));
                self.dictionary.append(Self::headword(key), value);
            }
            ColonVariant::MultiKey => {
                let value = normalize_palochka(&raw_value.replace("\\\"", "\""));
                for variant in expand_key(key) {
                    let headword = Self::headword(&variant);
                    if !headword.is_empty() {
                        self.dictionary.append(headword, value.clone());
                    }
                }
            }
            ColonVariant::Arabic { strip_markup } => {
                let mut cleaned = raw_value.to_string();
                for markup in strip_markup {
                    cleaned = cleaned.replace(markup.as_str(), " ");
                }
                let cleaned = collapse_whitespace(&cleaned.replace("\\\"", "'"));
                if cleaned.is_empty() {
                    return;
                }
                self.dictionary
                    .append_unique(Self::headword(key), normalize_palochka(&cleaned));
            }
        }
    }

    fn finish(self) -> ParsedSource {
        ParsedSource {
            dictionary: CanonicalDictionary::from_plain_text(self.dictionary),
            diagnostics: self.diagnostics,
        }
    }
}
