use std::collections::BTreeMap;

use anyhow::{Context, Result};
use regex::Regex;

use crate::model::{CanonicalDictionary, HtmlDictionary, WordEntry};

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\'' => out.push_str("&#39;"),
            '"' => out.push_str("&#34;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Turns canonical dictionaries into HTML-valued ones.
#[derive(Debug)]
pub(crate) struct HtmlRenderer {
    bold_marker: Regex,
}

impl HtmlRenderer {
    pub(crate) fn new() -> Result<Self> {
        Ok(Self {
            bold_marker: Regex::new(r"\|([^|]+)\|").context("failed to compile bold marker regex")?,
        })
    }

    /// Escapes `text` and turns `|bold|` pairs into spans.
    pub(crate) fn inline(&self, text: &str) -> String {
        self.bold_marker
            .replace_all(&escape_html(text), "<span style='font-weight:bold'>$1</span>")
            .into_owned()
    }

    /// One indented block per line of a parser-formatted value. The leading
    /// tab count sets the left margin in `em`.
    pub(crate) fn render_text_blocks(&self, value: &str) -> String {
        let mut out = String::new();
        for line in value.split('\n') {
            let content = line.trim_start_matches('\t');
            if content.trim().is_empty() {
                continue;
            }
            let depth = line.len() - content.len();
            out.push_str(&format!(
                "<div style='margin-left:{depth}em'>{}</div>",
                self.inline(content)
            ));
        }
        out
    }

    pub(crate) fn render_word_entry(&self, headword: &str, entry: &WordEntry) -> String {
        let mut out = format!("<div><h2>{}</h2>", escape_html(headword));

        if let Some(part_of_speech) = entry.part_of_speech.as_deref() {
            out.push_str(&format!("<p>Type: {}</p>", escape_html(part_of_speech)));
        }

        if !entry.cognates.is_empty() {
            out.push_str("<h3>Cognates:</h3>");
            for cognate in &entry.cognates {
                out.push_str(&format!(
                    "<div style='margin-left:1em'>{}: {}</div>",
                    escape_html(&cognate.dialect),
                    escape_html(&cognate.word)
                ));
            }
        }

        if let Some(redirect) = entry.redirect.as_deref() {
            out.push_str(&format!("<p>Redirect: {}</p>", escape_html(redirect)));
        }

        if !entry.definitions.is_empty() {
            out.push_str("<h3>Definitions:</h3>");
            for (index, definition) in entry.definitions.iter().enumerate() {
                out.push_str(&format!(
                    "<div style='margin-left:1em; margin-bottom:1em'><font color='darkblue'><span style='font-weight:bold'>{}.</span></font> {}</div>",
                    index + 1,
                    self.render_text_blocks(&definition.meaning)
                ));
                for example in &definition.examples {
                    out.push_str(&format!(
                        "<div style='margin-left:3em'>{} — {}</div>",
                        self.inline(&example.sentence),
                        self.inline(&example.translation)
                    ));
                }
            }
        }

        if let Some(derivation) = entry.derivation.as_deref() {
            out.push_str(&format!("<p>Derivation: {}</p>", escape_html(derivation)));
        }

        if !entry.synonyms.is_empty() {
            out.push_str("<h3>Synonyms:</h3>");
            for synonym in &entry.synonyms {
                out.push_str(&format!(
                    "<div style='margin-left:1em'>{}</div>",
                    escape_html(synonym)
                ));
            }
        }

        out.push_str("</div>");
        out
    }

    pub(crate) fn unify(&self, dictionary: CanonicalDictionary) -> HtmlDictionary {
        match dictionary {
            CanonicalDictionary::Html(dict) => HtmlDictionary {
                title: dict.title,
                id: dict.id,
                words_to_html_map: dict.words_to_plain_text_map,
                from_lang: dict.from_lang,
                to_lang: dict.to_lang,
            },
            CanonicalDictionary::Plain(dict) => {
                let words_to_html_map = dict
                    .words_to_plain_text_map
                    .iter()
                    .map(|(headword, values)| {
                        let rendered = values
                            .iter()
                            .map(|value| self.render_text_blocks(value))
                            .collect::<Vec<String>>();
                        (headword.clone(), rendered)
                    })
                    .collect::<BTreeMap<String, Vec<String>>>();
                HtmlDictionary {
                    title: dict.title,
                    id: dict.id,
                    words_to_html_map,
                    from_lang: dict.from_lang,
                    to_lang: dict.to_lang,
                }
            }
            CanonicalDictionary::Json(dict) => {
                let words_to_html_map = dict
                    .words_to_json_obj_map
                    .iter()
                    .map(|(headword, entry)| {
                        (headword.clone(), vec![self.render_word_entry(headword, entry)])
                    })
                    .collect::<BTreeMap<String, Vec<String>>>();
                HtmlDictionary {
                    title: dict.title,
                    id: dict.id,
                    words_to_html_map,
                    from_lang: dict.from_lang,
                    to_lang: dict.to_lang,
                }
            }
        }
    }
}
