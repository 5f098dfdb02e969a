use serde::{Deserialize, Deserializer};

use crate::model::{
    CanonicalDictionary, Example, SourceBinding, Strategy, StructuredDictionary, WordEntry,
};
use crate::text::{normalize_palochka, to_lower};

use super::line_scan::{LineParser, ParsedSource, invalid_line};

pub(crate) const SHAPSUG_DIALECT: &str = "shapsug";
pub(crate) const KABARDIAN_DIALECT: &str = "kabardian";

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Default, Deserialize)]
struct RawLink {
    #[serde(default, deserialize_with = "null_as_default")]
    word: String,
    #[serde(default, deserialize_with = "null_as_default")]
    clarity: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawExample {
    #[serde(default, deserialize_with = "null_as_default")]
    sentence: String,
    #[serde(default, deserialize_with = "null_as_default")]
    translation: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawDefinition {
    #[serde(default, deserialize_with = "null_as_default")]
    meaning: String,
    #[serde(default, deserialize_with = "null_as_default")]
    examples: Vec<RawExample>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSimpleEntry {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    part_of_speech: String,
    #[serde(default, deserialize_with = "null_as_default")]
    definitions: Vec<RawDefinition>,
    #[serde(default, deserialize_with = "null_as_default")]
    links: Vec<RawLink>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRichEntry {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    part_of_speech: String,
    #[serde(default, deserialize_with = "null_as_default")]
    shapsug: String,
    #[serde(default, deserialize_with = "null_as_default")]
    kabardian: String,
    #[serde(default, deserialize_with = "null_as_default")]
    synonyms: Vec<RawLink>,
    #[serde(default, deserialize_with = "null_as_default")]
    definitions: Vec<RawDefinition>,
}

/// Slice from the first `{` through the last `}`, if they form a pair.
pub(crate) fn frame_object(value: &str) -> Option<&str> {
    let first = value.find('{')?;
    let last = value.rfind('}')?;
    (last > first).then(|| &value[first..=last])
}

/// Strips bold markers, trims and normalizes a rich-entry text field.
pub(crate) fn clean_rich_text(text: &str) -> String {
    normalize_palochka(text.replace('|', "").trim())
}

/// One `"key": {...}` JSON object per line.
#[derive(Debug)]
pub(crate) struct StructuredJsonParser {
    rich: bool,
    normalize_key: bool,
    normalize_simple_text: bool,
    dictionary: StructuredDictionary,
    diagnostics: Vec<String>,
}

impl StructuredJsonParser {
    pub(crate) fn new(binding: &SourceBinding) -> Self {
        Self {
            rich: binding.strategy == Strategy::StructuredRich,
            normalize_key: binding.source_is_circassian(),
            normalize_simple_text: binding.target_is_circassian() || binding.mixed_script,
            dictionary: StructuredDictionary::new(binding),
            diagnostics: Vec::new(),
        }
    }

    fn clean_simple_text(&self, text: &str) -> String {
        let trimmed = text.trim();
        if self.normalize_simple_text {
            normalize_palochka(trimmed)
        } else {
            trimmed.to_string()
        }
    }

    fn simple_entry(&self, raw: RawSimpleEntry) -> WordEntry {
        let mut entry = WordEntry::new(&raw.part_of_speech);

        for definition in raw.definitions {
            let meaning = self.clean_simple_text(&definition.meaning);
            if !meaning.is_empty() {
                entry.add_definition(meaning, Vec::new());
            }
        }

        for link in raw.links {
            let word = self.clean_simple_text(&link.word);
            if word.is_empty() {
                continue;
            }
            let clarity = link.clarity.trim();
            let meaning = if clarity.is_empty() {
                word
            } else {
                format!("{word} ({clarity})")
            };
            entry.add_definition(meaning, Vec::new());
        }

        entry
    }

    fn rich_entry(raw: RawRichEntry) -> WordEntry {
        let mut entry = WordEntry::new(&raw.part_of_speech);

        for (dialect, spelling) in [
            (SHAPSUG_DIALECT, &raw.shapsug),
            (KABARDIAN_DIALECT, &raw.kabardian),
        ] {
            let word = clean_rich_text(spelling);
            if !word.is_empty() {
                entry.add_cognate(dialect, word);
            }
        }

        for synonym in raw.synonyms {
            let word = clean_rich_text(&synonym.word);
            if !word.is_empty() {
                entry.add_synonym(word, &clean_rich_text(&synonym.clarity));
            }
        }

        for definition in raw.definitions {
            let examples = definition
                .examples
                .iter()
                .map(|example| Example {
                    sentence: clean_rich_text(&example.sentence),
                    translation: clean_rich_text(&example.translation),
                })
                .filter(|example| !example.sentence.is_empty() || !example.translation.is_empty())
                .collect::<Vec<Example>>();
            let meaning = clean_rich_text(&definition.meaning);

            if meaning.is_empty() && examples.is_empty() {
                continue;
            }
            entry.add_definition(meaning, examples);
        }

        entry
    }

    fn headword(&self, raw_key: &str) -> String {
        let key = raw_key.trim().trim_matches('"');
        if self.normalize_key {
            to_lower(&normalize_palochka(key))
        } else {
            to_lower(key)
        }
    }
}

impl LineParser for StructuredJsonParser {
    fn feed(&mut self, line_number: usize, line: &str) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed == "{" || trimmed == "}" {
            return;
        }
        let trimmed = trimmed.strip_suffix(',').unwrap_or(trimmed);

        let Some((raw_key, raw_value)) = trimmed.split_once(':') else {
            self.diagnostics.push(invalid_line(line_number, trimmed));
            return;
        };

        let headword = self.headword(raw_key);
        if headword.is_empty() {
            return;
        }

        let Some(object) = frame_object(raw_value) else {
            self.diagnostics
                .push(format!("no JSON object on line {line_number}: {trimmed}"));
            return;
        };

        let entry = if self.rich {
            match serde_json::from_str::<RawRichEntry>(object) {
                Ok(raw) => Self::rich_entry(raw),
                Err(err) => {
                    self.diagnostics
                        .push(format!("JSON parse error on line {line_number}: {err}"));
                    return;
                }
            }
        } else {
            match serde_json::from_str::<RawSimpleEntry>(object) {
                Ok(raw) => self.simple_entry(raw),
                Err(err) => {
                    self.diagnostics
                        .push(format!("JSON parse error on line {line_number}: {err}"));
                    return;
                }
            }
        };

        if !entry.is_empty() {
            self.dictionary.insert_or_merge(headword, entry);
        }
    }

    fn finish(self) -> ParsedSource {
        ParsedSource {
            dictionary: CanonicalDictionary::Json(self.dictionary),
            diagnostics: self.diagnostics,
        }
    }
}
