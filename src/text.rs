//! Text heuristics shared by every pipeline stage.
//!
//! The central piece is [`normalize_palochka`], which folds the letters that
//! are routinely typed or OCR'd in place of the Circassian palochka into the
//! conventional digit `1`.

use std::sync::LazyLock;

use regex::Regex;

const PALOCHKA_LOOKALIKES: [char; 9] = [
    'I', 'i', 'l', '\u{0131}', '\u{0130}', '\u{04C0}', '\u{04CF}', '\u{0406}', '\u{0456}',
];

static CYRILLIC_LETTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\p{Cyrillic}$").expect("valid Cyrillic script regex"));

const TRAILING_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '-', '!', '?', '"', '\'', '(', ')', '[', ']',
];

const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{FEFF}', '\u{200D}', '\u{200C}'];

const CIRCASSIAN_LANGUAGE_CODES: [&str; 2] = ["ady", "kbd"];

pub fn is_palochka_lookalike(ch: char) -> bool {
    PALOCHKA_LOOKALIKES.contains(&ch)
}

pub fn is_cyrillic(ch: char) -> bool {
    let mut buf = [0u8; 4];
    CYRILLIC_LETTER.is_match(ch.encode_utf8(&mut buf))
}

/// Replaces palochka look-alikes that touch a Cyrillic letter with `1`.
///
/// Two passes run in order over the whole string: first every look-alike
/// preceded by a Cyrillic letter, then every look-alike followed by one.
/// Each pass judges a character against its neighbours in that pass's input,
/// so the result never contains a look-alike adjacent to a Cyrillic letter
/// and applying the function twice changes nothing. A run of look-alikes
/// touching a Cyrillic letter is folded completely (`кіі` becomes `к11`).
pub fn normalize_palochka(input: &str) -> String {
    if !input.chars().any(is_palochka_lookalike) {
        return input.to_string();
    }

    let chars = input.chars().collect::<Vec<char>>();
    let after_cyrillic = replace_lookalikes(&chars, |chars, index| {
        index > 0 && is_cyrillic(chars[index - 1])
    });
    let before_cyrillic = replace_lookalikes(&after_cyrillic, |chars, index| {
        chars
            .get(index + 1)
            .map(|next| is_cyrillic(*next))
            .unwrap_or(false)
    });

    before_cyrillic.into_iter().collect()
}

fn replace_lookalikes(chars: &[char], touches_cyrillic: impl Fn(&[char], usize) -> bool) -> Vec<char> {
    chars
        .iter()
        .enumerate()
        .map(|(index, ch)| {
            if is_palochka_lookalike(*ch) && touches_cyrillic(chars, index) {
                '1'
            } else {
                *ch
            }
        })
        .collect()
}

/// Lower-cases a headword. Turkish dotted capital I folds to a plain `i`
/// instead of `i` plus a combining dot.
pub fn to_lower(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch == '\u{0130}' {
            out.push('i');
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}

pub fn trim_trailing_punctuation(input: &str) -> &str {
    input.trim_end_matches(TRAILING_PUNCTUATION)
}

pub fn strip_zero_width(input: &str) -> &str {
    input.trim_matches(ZERO_WIDTH)
}

/// True when the token has at least one letter and all of its letters are
/// uppercase. Digits and punctuation are ignored.
pub fn is_fully_capitalized(token: &str) -> bool {
    let stripped = trim_trailing_punctuation(token);
    let mut has_letter = false;

    for ch in stripped.chars() {
        if ch.is_alphabetic() {
            has_letter = true;
            if !ch.is_uppercase() {
                return false;
            }
        }
    }

    has_letter
}

pub fn starts_with_ascii_digit(input: &str) -> bool {
    input
        .as_bytes()
        .first()
        .map(|byte| byte.is_ascii_digit())
        .unwrap_or(false)
}

pub fn starts_with_special_character(input: &str) -> bool {
    input
        .chars()
        .next()
        .map(|ch| !ch.is_alphabetic() && !ch.is_numeric())
        .unwrap_or(false)
}

pub fn is_circassian_language(code: &str) -> bool {
    let lowered = code.trim().to_ascii_lowercase();
    CIRCASSIAN_LANGUAGE_CODES.contains(&lowered.as_str())
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}
