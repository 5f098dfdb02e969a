use std::collections::{BTreeMap, HashSet};
use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::text::is_circassian_language;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DictFormat {
    Html,
    Json,
    Plain,
}

impl DictFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Json => "json",
            Self::Plain => "plain",
        }
    }
}

impl TryFrom<u8> for DictFormat {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Html),
            2 => Ok(Self::Json),
            3 => Ok(Self::Plain),
            other => Err(format!("unknown dictionary format discriminant {other}")),
        }
    }
}

impl From<DictFormat> for u8 {
    fn from(value: DictFormat) -> Self {
        match value {
            DictFormat::Html => 1,
            DictFormat::Json => 2,
            DictFormat::Plain => 3,
        }
    }
}

impl fmt::Display for DictFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlainTextDictionary {
    pub title: String,
    pub id: u32,
    pub words_to_plain_text_map: BTreeMap<String, Vec<String>>,
    pub from_lang: String,
    pub to_lang: String,
    pub format: DictFormat,
}

impl PlainTextDictionary {
    pub fn new(binding: &SourceBinding, format: DictFormat) -> Self {
        Self {
            title: binding.title.clone(),
            id: binding.id,
            words_to_plain_text_map: BTreeMap::new(),
            from_lang: binding.from_lang.clone(),
            to_lang: binding.to_lang.clone(),
            format,
        }
    }

    pub fn append(&mut self, headword: String, value: String) {
        self.words_to_plain_text_map
            .entry(headword)
            .or_default()
            .push(value);
    }

    /// Appends unless the exact value is already filed under the headword.
    pub fn append_unique(&mut self, headword: String, value: String) {
        let values = self.words_to_plain_text_map.entry(headword).or_default();
        if !values.contains(&value) {
            values.push(value);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub sentence: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub translation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<Example>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cognate {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dialect: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub word: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub definitions: Vec<Definition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cognates: Vec<Cognate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl WordEntry {
    pub fn new(part_of_speech: &str) -> Self {
        let trimmed = part_of_speech.trim();
        Self {
            part_of_speech: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..Self::default()
        }
    }

    pub fn add_definition(&mut self, meaning: String, examples: Vec<Example>) {
        self.definitions.push(Definition { meaning, examples });
    }

    pub fn add_cognate(&mut self, dialect: &str, word: String) {
        self.cognates.push(Cognate {
            dialect: dialect.to_string(),
            word,
        });
    }

    pub fn add_synonym(&mut self, word: String, clarity: &str) {
        if clarity.is_empty() {
            self.synonyms.push(word);
        } else {
            self.synonyms.push(format!("{word} ({clarity})"));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty() && self.cognates.is_empty() && self.synonyms.is_empty()
    }

    /// Concatenates the list fields of a later occurrence. Scalar fields keep
    /// the first value seen.
    pub fn absorb(&mut self, later: WordEntry) {
        self.definitions.extend(later.definitions);
        self.cognates.extend(later.cognates);
        self.synonyms.extend(later.synonyms);
        if self.part_of_speech.is_none() {
            self.part_of_speech = later.part_of_speech;
        }
        if self.redirect.is_none() {
            self.redirect = later.redirect;
        }
        if self.derivation.is_none() {
            self.derivation = later.derivation;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredDictionary {
    pub title: String,
    pub id: u32,
    pub format: DictFormat,
    pub from_lang: String,
    pub to_lang: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub words_to_json_obj_map: BTreeMap<String, WordEntry>,
}

impl StructuredDictionary {
    pub fn new(binding: &SourceBinding) -> Self {
        Self {
            title: binding.title.clone(),
            id: binding.id,
            format: DictFormat::Json,
            from_lang: binding.from_lang.clone(),
            to_lang: binding.to_lang.clone(),
            words_to_json_obj_map: BTreeMap::new(),
        }
    }

    pub fn insert_or_merge(&mut self, headword: String, entry: WordEntry) {
        match self.words_to_json_obj_map.get_mut(&headword) {
            Some(existing) => existing.absorb(entry),
            None => {
                self.words_to_json_obj_map.insert(headword, entry);
            }
        }
    }
}

/// A phase-02 dictionary, tagged by its on-disk `format` discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalDictionary {
    Html(PlainTextDictionary),
    Plain(PlainTextDictionary),
    Json(StructuredDictionary),
}

impl CanonicalDictionary {
    pub fn format(&self) -> DictFormat {
        match self {
            Self::Html(_) => DictFormat::Html,
            Self::Plain(_) => DictFormat::Plain,
            Self::Json(_) => DictFormat::Json,
        }
    }

    pub fn from_plain_text(mut dict: PlainTextDictionary) -> Self {
        match dict.format {
            DictFormat::Html => Self::Html(dict),
            DictFormat::Plain | DictFormat::Json => {
                dict.format = DictFormat::Plain;
                Self::Plain(dict)
            }
        }
    }

    pub fn headword_count(&self) -> usize {
        match self {
            Self::Html(dict) | Self::Plain(dict) => dict.words_to_plain_text_map.len(),
            Self::Json(dict) => dict.words_to_json_obj_map.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HtmlDictionary {
    pub title: String,
    pub id: u32,
    pub words_to_html_map: BTreeMap<String, Vec<String>>,
    pub from_lang: String,
    pub to_lang: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedEntry {
    pub id: u32,
    pub html: String,
}

pub type MergedIndex = BTreeMap<String, Vec<MergedEntry>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryInfo {
    pub id: u32,
    pub title: String,
    pub from_lang: String,
    pub to_lang: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    ColonDelimited,
    ColonArabic,
    ColonMultiKey,
    StructuredSimple,
    StructuredRich,
    CapitalizedExplanatory,
    CapitalizedTurkish,
    CapitalizedOcr,
    SingleLine,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ColonDelimited => "colon_delimited",
            Self::ColonArabic => "colon_arabic",
            Self::ColonMultiKey => "colon_multi_key",
            Self::StructuredSimple => "structured_simple",
            Self::StructuredRich => "structured_rich",
            Self::CapitalizedExplanatory => "capitalized_explanatory",
            Self::CapitalizedTurkish => "capitalized_turkish",
            Self::CapitalizedOcr => "capitalized_ocr",
            Self::SingleLine => "single_line",
        }
    }

    pub fn is_structured(self) -> bool {
        matches!(self, Self::StructuredSimple | Self::StructuredRich)
    }

    pub fn default_format(self) -> DictFormat {
        match self {
            Self::ColonDelimited | Self::ColonMultiKey => DictFormat::Html,
            Self::StructuredSimple | Self::StructuredRich => DictFormat::Json,
            Self::ColonArabic
            | Self::CapitalizedExplanatory
            | Self::CapitalizedTurkish
            | Self::CapitalizedOcr
            | Self::SingleLine => DictFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairKind {
    DetachedNumbers,
    SpacedHeadword,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBinding {
    pub file: String,
    pub title: String,
    pub id: u32,
    pub from_lang: String,
    pub to_lang: String,
    pub strategy: Strategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DictFormat>,
    #[serde(default)]
    pub mixed_script: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strip_markup: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair: Option<RepairKind>,
}

impl SourceBinding {
    pub fn output_format(&self) -> DictFormat {
        self.format.unwrap_or_else(|| self.strategy.default_format())
    }

    pub fn output_file_name(&self) -> String {
        match self.file.strip_suffix(".txt") {
            Some(stem) => format!("{stem}.json"),
            None => self.file.clone(),
        }
    }

    pub fn source_is_circassian(&self) -> bool {
        is_circassian_language(&self.from_lang)
    }

    pub fn target_is_circassian(&self) -> bool {
        is_circassian_language(&self.to_lang)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub sources: Vec<SourceBinding>,
}

impl Catalog {
    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            bail!("catalog lists no sources");
        }

        let mut seen_files = HashSet::<&str>::new();
        for binding in &self.sources {
            if binding.file.trim().is_empty() {
                bail!("catalog entry for dictionary {} has an empty file name", binding.id);
            }
            if !seen_files.insert(binding.file.as_str()) {
                bail!("catalog lists {} more than once", binding.file);
            }

            let structured = binding.strategy.is_structured();
            if structured != (binding.output_format() == DictFormat::Json) {
                bail!(
                    "{} cannot be written as {} by the {} strategy",
                    binding.file,
                    binding.output_format(),
                    binding.strategy.as_str()
                );
            }
        }

        Ok(())
    }

    pub fn select(&self, files: &[String]) -> Result<Vec<&SourceBinding>> {
        if files.is_empty() {
            return Ok(self.sources.iter().collect());
        }

        let mut selected = Vec::with_capacity(files.len());
        for file in files {
            match self.sources.iter().find(|binding| &binding.file == file) {
                Some(binding) => selected.push(binding),
                None => bail!("{file} is not listed in the catalog"),
            }
        }
        Ok(selected)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceRunSummary {
    pub file: String,
    pub id: u32,
    pub strategy: String,
    pub format: String,
    pub sha256: String,
    pub headword_count: usize,
    pub diagnostic_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParseRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub started_at: String,
    pub completed_at: String,
    pub raw_dir: String,
    pub output_dir: String,
    pub max_line_bytes: usize,
    pub sources: Vec<SourceRunSummary>,
}
