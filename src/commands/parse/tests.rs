use std::collections::BTreeMap;
use std::fs;

use crate::model::{CanonicalDictionary, Catalog, DictFormat, WordEntry};
use crate::util::ContentLayout;

use super::numbering::NumberingStyle;
use super::*;

fn binding(strategy: Strategy, from_lang: &str, to_lang: &str) -> SourceBinding {
    SourceBinding {
        file: "07-test.json".to_string(),
        title: "Test dictionary".to_string(),
        id: 7,
        from_lang: from_lang.to_string(),
        to_lang: to_lang.to_string(),
        strategy,
        format: None,
        mixed_script: false,
        strip_markup: Vec::new(),
        repair: None,
    }
}

fn feed_lines<P: LineParser>(mut parser: P, lines: &[&str]) -> ParsedSource {
    for (index, line) in lines.iter().enumerate() {
        parser.feed(index + 1, line);
    }
    parser.finish()
}

fn plain_map(parsed: &ParsedSource) -> &BTreeMap<String, Vec<String>> {
    match &parsed.dictionary {
        CanonicalDictionary::Html(dict) | CanonicalDictionary::Plain(dict) => {
            &dict.words_to_plain_text_map
        }
        other => panic!("expected a plain-text dictionary, got {}", other.format()),
    }
}

fn structured_map(parsed: &ParsedSource) -> &BTreeMap<String, WordEntry> {
    match &parsed.dictionary {
        CanonicalDictionary::Json(dict) => &dict.words_to_json_obj_map,
        other => panic!("expected a structured dictionary, got {}", other.format()),
    }
}

fn meanings(entry: &WordEntry) -> Vec<&str> {
    entry
        .definitions
        .iter()
        .map(|definition| definition.meaning.as_str())
        .collect()
}

#[test]
fn colon_parser_strips_quotes_and_trailing_comma() {
    let parser = ColonDelimitedParser::new(&binding(Strategy::ColonDelimited, "Ru", "Ady"));
    let parsed = feed_lines(parser, &["{", r#"  "слово": "значение","#, "}"]);

    assert_eq!(parsed.dictionary.format(), DictFormat::Html);
    assert_eq!(plain_map(&parsed)["слово"], vec!["значение"]);
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn colon_parser_lowercases_normalizes_and_unescapes() {
    let parser = ColonDelimitedParser::new(&binding(Strategy::ColonDelimited, "Kbd", "Ru"));
    let parsed = feed_lines(
        parser,
        &[
            r#""ГущыIэ": "кIуэ \"идти\" далеко","#,
            r#""гущыIэ": "second","#,
        ],
    );

    assert_eq!(
        plain_map(&parsed)["гущы1э"],
        vec![r#"к1уэ "идти" далеко"#, "second"]
    );
}

#[test]
fn colon_parser_reports_missing_colon_and_skips_empty_key() {
    let parser = ColonDelimitedParser::new(&binding(Strategy::ColonDelimited, "Ru", "Ady"));
    let parsed = feed_lines(parser, &["no separator here", r#""": "orphan","#, ""]);

    assert!(plain_map(&parsed).is_empty());
    assert_eq!(parsed.diagnostics, vec!["invalid line 1: no separator here"]);
}

#[test]
fn arabic_variant_strips_markup_and_deduplicates() {
    let parser = ColonDelimitedParser::new(&binding(Strategy::ColonArabic, "Ar", "Ady"));
    let line = r#""كتاب": "<div style=\"margin-left:1em\">book   of  </div> pages","#;
    let parsed = feed_lines(
        parser,
        &[line, line, r#""فارغ": "<div style=\"margin-left:1em\"></div>","#],
    );

    assert_eq!(parsed.dictionary.format(), DictFormat::Plain);
    let map = plain_map(&parsed);
    assert_eq!(map["كتاب"], vec!["book of pages"]);
    assert!(!map.contains_key("فارغ"));
}

#[test]
fn arabic_variant_uses_binding_strip_list() {
    let mut arabic = binding(Strategy::ColonArabic, "Ar", "Ady");
    arabic.strip_markup = vec!["<p>".to_string(), "</p>".to_string()];
    let parser = ColonDelimitedParser::new(&arabic);
    let parsed = feed_lines(parser, &[r#""باب": "<p>door</p>","#]);

    assert_eq!(plain_map(&parsed)["باب"], vec!["door"]);
}

#[test]
fn expand_key_handles_shared_prefix_and_suffix() {
    assert_eq!(
        expand_key("Прэфикс ВариантА / ВариантБ"),
        vec!["Прэфикс ВариантА", "Прэфикс ВариантБ"]
    );
    assert_eq!(
        expand_key("ВариантА / ВариантБ Суффикс"),
        vec!["ВариантА Суффикс", "ВариантБ Суффикс"]
    );
    assert_eq!(expand_key("а / б / в"), vec!["а", "б", "в"]);
    assert_eq!(expand_key("два слова / два слова"), vec!["два слова", "два слова"]);
    assert_eq!(expand_key("одно"), vec!["одно"]);
}

#[test]
fn multi_key_parser_files_value_under_every_variant() {
    let parser = ColonDelimitedParser::new(&binding(Strategy::ColonMultiKey, "Ru", "Ady"));
    let parsed = feed_lines(parser, &[r#""Прэфикс ВариантА / ВариантБ": "value","#]);

    let map = plain_map(&parsed);
    assert_eq!(map.len(), 2);
    assert_eq!(map["прэфикс варианта"], vec!["value"]);
    assert_eq!(map["прэфикс вариантб"], vec!["value"]);
}

#[test]
fn frame_object_requires_a_brace_pair() {
    assert_eq!(frame_object(r#" x {"a": 1} y"#), Some(r#"{"a": 1}"#));
    assert_eq!(frame_object("}{"), None);
    assert_eq!(frame_object("no braces"), None);
}

#[test]
fn simple_json_builds_definitions_from_meanings_and_links() {
    let parser = StructuredJsonParser::new(&binding(Strategy::StructuredSimple, "Kbd", "Ru"));
    let parsed = feed_lines(
        parser,
        &[
            "{",
            r#""ГущыIэ": {"type": "noun", "definitions": [{"meaning": " кIуэ "}, {"meaning": ""}], "links": [{"word": "псалъэ", "clarity": " rare "}, {"word": "other", "clarity": null}]},"#,
            "}",
        ],
    );

    let map = structured_map(&parsed);
    let entry = &map["гущы1э"];
    assert_eq!(entry.part_of_speech.as_deref(), Some("noun"));
    assert_eq!(meanings(entry), vec!["кIуэ", "псалъэ (rare)", "other"]);
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn simple_json_normalizes_text_for_circassian_targets_and_mixed_sources() {
    let parser = StructuredJsonParser::new(&binding(Strategy::StructuredSimple, "Ru", "Ady"));
    let parsed = feed_lines(parser, &[r#""Идти": {"definitions": [{"meaning": "кIуэн"}]}"#]);
    let map = structured_map(&parsed);
    assert_eq!(meanings(&map["идти"]), vec!["к1уэн"]);

    let mut mixed = binding(Strategy::StructuredSimple, "Kbd", "Ru/En");
    mixed.mixed_script = true;
    let parsed = feed_lines(
        StructuredJsonParser::new(&mixed),
        &[r#""кIуэн": {"definitions": [{"meaning": "кIуэн, to go"}]}"#],
    );
    assert_eq!(meanings(&structured_map(&parsed)["к1уэн"]), vec!["к1уэн, to go"]);
}

#[test]
fn simple_json_skips_records_without_definitions() {
    let parser = StructuredJsonParser::new(&binding(Strategy::StructuredSimple, "Ru", "Ady"));
    let parsed = feed_lines(parser, &[r#""пусто": {"type": "noun", "definitions": []}"#]);

    assert!(structured_map(&parsed).is_empty());
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn structured_parser_records_undecodable_lines() {
    let parser = StructuredJsonParser::new(&binding(Strategy::StructuredSimple, "Ru", "Ady"));
    let parsed = feed_lines(
        parser,
        &[
            r#""a": "plain string""#,
            r#""b": {"definitions": 5}"#,
            "no colon",
        ],
    );

    assert!(structured_map(&parsed).is_empty());
    assert_eq!(parsed.diagnostics.len(), 3);
    assert!(parsed.diagnostics[0].starts_with("no JSON object on line 1"));
    assert!(parsed.diagnostics[1].starts_with("JSON parse error on line 2"));
    assert_eq!(parsed.diagnostics[2], "invalid line 3: no colon");
}

#[test]
fn rich_json_merges_repeated_headwords_in_order() {
    let parser = StructuredJsonParser::new(&binding(Strategy::StructuredRich, "Ady", "Ady"));
    let parsed = feed_lines(
        parser,
        &[
            r#""унэ": {"type": "noun", "definitions": [{"meaning": "|first| sense"}]},"#,
            r#""унэ": {"type": "verb", "definitions": [{"meaning": "second sense"}]},"#,
        ],
    );

    let entry = &structured_map(&parsed)["унэ"];
    assert_eq!(meanings(entry), vec!["first sense", "second sense"]);
    assert_eq!(entry.part_of_speech.as_deref(), Some("noun"));
}

#[test]
fn rich_json_cleans_cognates_synonyms_and_examples() {
    let parser = StructuredJsonParser::new(&binding(Strategy::StructuredRich, "Ady", "Ady"));
    let parsed = feed_lines(
        parser,
        &[
            r#""шы": {"shapsug": " шIы ", "kabardian": "", "synonyms": [{"word": "|чъы|", "clarity": "kIэ"}, {"word": ""}], "definitions": [{"meaning": "", "examples": [{"sentence": "Шыр кIуагъэ", "translation": "|The horse| left"}, {"sentence": " ", "translation": ""}]}]}"#,
            r#""шъо": {"shapsug": "шъуэ"}"#,
        ],
    );

    let map = structured_map(&parsed);
    let entry = &map["шы"];
    assert_eq!(entry.cognates.len(), 1);
    assert_eq!(entry.cognates[0].dialect, SHAPSUG_DIALECT);
    assert_eq!(entry.cognates[0].word, "ш1ы");
    assert_eq!(entry.synonyms, vec!["чъы (k1э)"]);
    assert_eq!(entry.definitions.len(), 1);
    assert_eq!(entry.definitions[0].meaning, "");
    assert_eq!(entry.definitions[0].examples.len(), 1);
    assert_eq!(entry.definitions[0].examples[0].sentence, "Шыр к1уагъэ");
    assert_eq!(entry.definitions[0].examples[0].translation, "The horse left");

    assert_eq!(map["шъо"].cognates[0].word, "шъуэ");
}

#[test]
fn capitalized_parser_accumulates_until_next_headword_and_flushes_last() {
    let parser = CapitalizedParser::new(&binding(Strategy::CapitalizedExplanatory, "Ady", "Ru"))
        .expect("parser");
    let parsed = feed_lines(
        parser,
        &[
            "СЛОВО значение1",
            "продолжение значение1",
            "",
            "ДРУГОЕ значение2",
        ],
    );

    let map = plain_map(&parsed);
    assert_eq!(map["слово"], vec!["СЛОВО значение1 продолжение значение1"]);
    assert_eq!(map["другое"], vec!["ДРУГОЕ значение2"]);
    assert!(parsed.diagnostics.is_empty());
}

#[test]
fn explanatory_preset_detects_headwords_with_palochka_lookalikes() {
    let parser = CapitalizedParser::new(&binding(Strategy::CapitalizedExplanatory, "Ady", "Ru"))
        .expect("parser");
    let parsed = feed_lines(
        parser,
        &[
            "\u{FEFF}ЗЕФЭГЪОШIУ, зэфэгъэш1у 1. first 2. second",
            "1. leading sense",
            "Слово is not a headword",
        ],
    );

    let map = plain_map(&parsed);
    assert_eq!(map.len(), 1);
    assert_eq!(
        map["зефэгъош1у"],
        vec!["ЗЕФЭГЪОШ1У, зэфэгъэш1у\n\t1. first\n\t2. second \n\t1. leading sense Слово is not a headword"]
    );
}

#[test]
fn capitalized_parser_reports_text_before_first_headword() {
    let parser = CapitalizedParser::new(&binding(Strategy::CapitalizedExplanatory, "Ady", "Ru"))
        .expect("parser");
    let parsed = feed_lines(parser, &["preface text", "СЛОВО value"]);

    assert_eq!(plain_map(&parsed).len(), 1);
    assert_eq!(
        parsed.diagnostics,
        vec!["text before the first headword on line 1: preface text"]
    );
}

#[test]
fn turkish_preset_rejects_range_headers_and_digit_tokens() {
    let parser = CapitalizedParser::new(&binding(Strategy::CapitalizedTurkish, "Tr", "Ady"))
        .expect("parser");
    let parsed = feed_lines(
        parser,
        &[
            "A-B",
            "İLK: birinci 1. tIэ 1) x",
            "2A not a headword",
            "KAPI: kapI",
        ],
    );

    let map = plain_map(&parsed);
    assert_eq!(map.len(), 2);
    assert_eq!(
        map["ilk"],
        vec!["İLK: birinci\n\t1. t1э\n\t\t1) x 2A not a headword"]
    );
    assert_eq!(map["kapi"], vec!["KAPI: kapI"]);
    assert_eq!(parsed.diagnostics, vec!["range header on line 1: A-B"]);
}

#[test]
fn ocr_preset_collapses_spaced_capitals_before_detection() {
    let parser = CapitalizedParser::new(&binding(Strategy::CapitalizedOcr, "Ady", "Ru"))
        .expect("parser");
    assert_eq!(
        parser.collapse_spaced_capitals("А Б А Д З Э (ж.) текст"),
        "АБАДЗЭ (ж.) текст"
    );

    let parsed = feed_lines(parser, &["А Б А Д З Э (ж.) текст", "ШI У ещё"]);
    let map = plain_map(&parsed);
    assert_eq!(map.len(), 2);
    assert_eq!(map["абадзэ"], vec!["АБАДЗЭ (ж.) текст"]);
    assert_eq!(map["ш1у"], vec!["Ш1У ещё"]);
}

#[test]
fn single_line_parser_normalizes_key_only_for_circassian_sources() {
    let russian = feed_lines(
        SingleLineParser::new(&binding(Strategy::SingleLine, "Ru", "Kbd")),
        &["Идти кIуэн 1. a 2) b", "   "],
    );
    assert_eq!(
        plain_map(&russian)["идти"],
        vec!["Идти к1уэн\n\t1. a\n\t\t2) b"]
    );

    let kabardian = feed_lines(
        SingleLineParser::new(&binding(Strategy::SingleLine, "Kbd", "Ru")),
        &["кIуэн идти"],
    );
    assert_eq!(plain_map(&kabardian)["к1уэн"], vec!["к1уэн идти"]);
}

#[test]
fn numbering_styles_are_selected_by_preset() {
    assert_eq!(
        CapitalizedPreset::for_strategy(Strategy::CapitalizedTurkish).numbering,
        NumberingStyle::DotsAndParens
    );
    assert_eq!(
        CapitalizedPreset::for_strategy(Strategy::CapitalizedOcr).numbering,
        NumberingStyle::DotsStartAware
    );
}

#[test]
fn scan_lines_strips_terminators_and_numbers_from_one() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("source.txt");
    fs::write(&path, "first\r\nsecond\n\nlast").expect("write");

    let mut seen = Vec::new();
    let count = scan_lines(&path, 64, |number, line| seen.push((number, line.to_string())))
        .expect("scan");

    assert_eq!(count, 4);
    assert_eq!(
        seen,
        vec![
            (1, "first".to_string()),
            (2, "second".to_string()),
            (3, String::new()),
            (4, "last".to_string()),
        ]
    );
}

#[test]
fn scan_lines_fails_on_overlong_line_and_invalid_utf8() {
    let dir = tempfile::tempdir().expect("tempdir");

    let long = dir.path().join("long.txt");
    fs::write(&long, format!("ok\n{}\n", "x".repeat(17))).expect("write");
    let err = scan_lines(&long, 16, |_, _| {}).expect_err("line too long");
    assert!(err.to_string().contains("line 2"));

    let exact = dir.path().join("exact.txt");
    fs::write(&exact, format!("{}\r\n", "x".repeat(16))).expect("write");
    assert_eq!(scan_lines(&exact, 16, |_, _| {}).expect("scan"), 1);

    let binary = dir.path().join("binary.txt");
    fs::write(&binary, b"ok\n\xff\xfe\n").expect("write");
    let err = scan_lines(&binary, 16, |_, _| {}).expect_err("invalid utf-8");
    assert!(err.to_string().contains("not valid UTF-8"));

    let missing = dir.path().join("missing.txt");
    assert!(scan_lines(&missing, 16, |_, _| {}).is_err());
}

#[test]
fn parse_catalog_writes_canonical_files_and_manifest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = ContentLayout::new(dir.path());
    fs::create_dir_all(layout.raw_dir()).expect("mkdir");
    fs::write(
        layout.raw_dir().join("07-test.json"),
        "{\n\"слово\": \"<b>значение</b>\",\nbroken\n}\n",
    )
    .expect("write raw");

    let mut plain = binding(Strategy::SingleLine, "Kbd", "Ru");
    plain.file = "08-test.txt".to_string();
    plain.id = 8;
    fs::write(layout.raw_dir().join("08-test.txt"), "кIуэн идти\n").expect("write raw");

    let catalog = Catalog {
        sources: vec![binding(Strategy::ColonDelimited, "Ru", "Ady"), plain],
    };

    let manifest = parse_catalog(&layout, &catalog, &[], 1024).expect("parse");
    assert_eq!(manifest.sources.len(), 2);
    assert_eq!(manifest.sources[0].headword_count, 1);
    assert_eq!(manifest.sources[0].diagnostic_count, 1);
    assert_eq!(manifest.sources[0].format, "html");
    assert_eq!(manifest.sources[0].sha256.len(), 64);

    let html = fs::read_to_string(layout.canonical_dir().join("07-test.json")).expect("read");
    assert!(html.contains("\"format\": 1"));
    assert!(html.contains("\"слово\": [\n\t\t\t\"<b>значение</b>\""));

    let plain = fs::read_to_string(layout.canonical_dir().join("08-test.json")).expect("read");
    assert!(plain.contains("\"format\": 3"));
    assert!(plain.contains("\"к1уэн\""));

    let manifests = fs::read_dir(layout.manifest_dir()).expect("manifest dir").count();
    assert_eq!(manifests, 1);
}

#[test]
fn parse_catalog_fails_when_raw_source_is_missing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let layout = ContentLayout::new(dir.path());
    let catalog = Catalog {
        sources: vec![binding(Strategy::ColonDelimited, "Ru", "Ady")],
    };

    let err = parse_catalog(&layout, &catalog, &[], 1024).expect_err("missing source");
    assert!(err.to_string().contains("raw source missing"));
}
