//! Spoken transcript normalization.
//!
//! Turns a French or Arabic transcript such as `"deux cents plus dix"` into
//! text the expression evaluator reads (`"200+10"`).
//! Steps run in a fixed order:
//! 1. `<word> cent(s)` becomes the word's value times 100
//! 2. Arabic-indic digits become ASCII digits
//! 3. whole-word corrections (separators, connectors, currency words)
//! 4. number words become digits, longest word first
//! 5. decimal commas become points and spaces around `+` collapse
//! 6. without a `+`, everything but digits and `.` is dropped

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

/// Number words and their values.
const NUMBER_WORDS: &[(&str, u32)] = &[
    ("zéro", 0),
    ("un", 1),
    ("deux", 2),
    ("trois", 3),
    ("quatre", 4),
    ("cinq", 5),
    ("six", 6),
    ("sept", 7),
    ("huit", 8),
    ("neuf", 9),
    ("dix", 10),
    ("onze", 11),
    ("douze", 12),
    ("treize", 13),
    ("quatorze", 14),
    ("quinze", 15),
    ("seize", 16),
    ("vingt", 20),
    ("trente", 30),
    ("quarante", 40),
    ("cinquante", 50),
    ("soixante", 60),
    ("soixante-dix", 70),
    ("quatre-vingt", 80),
    ("quatre-vingt-dix", 90),
    ("cent", 100),
    ("cents", 100),
    ("mille", 1000),
    ("صفر", 0),
    ("واحد", 1),
    ("اثنين", 2),
    ("ثلاثة", 3),
    ("اربعة", 4),
    ("خمسة", 5),
    ("ستة", 6),
    ("سبعة", 7),
    ("ثمانية", 8),
    ("تسعة", 9),
    ("عشرة", 10),
    ("عشرين", 20),
    ("ثلاثين", 30),
    ("اربعين", 40),
    ("خمسين", 50),
    ("ستين", 60),
    ("سبعين", 70),
    ("ثمانين", 80),
    ("تسعين", 90),
    ("مية", 100),
    ("الف", 1000),
];

/// Whole-word corrections applied before number words.
const CORRECTIONS: &[(&str, &str)] = &[
    ("virgule", "."),
    ("point", "."),
    ("فاصلة", "."),
    ("نقطة", "."),
    ("plus", "+"),
    ("et", "+"),
    ("زائد", "+"),
    ("و", "+"),
    ("euro", ""),
    ("euros", ""),
    ("دينار", ""),
    ("دنانير", ""),
    ("zéros", "zéro"),
    ("موافق", "ok"),
    ("نعم", "ok"),
];

fn number_value(word: &str) -> Option<u32> {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, value)| value)
}

fn correction(word: &str) -> Option<&'static str> {
    CORRECTIONS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|&(_, replacement)| replacement)
}

/// Builds a whole-word alternation, longest words first.
fn word_alternation<'a>(words: impl Iterator<Item = &'a str>) -> String {
    let mut words: Vec<&str> = words.collect();
    words.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    let escaped: Vec<String> = words.into_iter().map(regex::escape).collect();
    format!(r"\b(?:{})\b", escaped.join("|"))
}

static HUNDREDS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s+cents?\b").expect("hundreds pattern is valid"));

static CORRECTION_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&word_alternation(CORRECTIONS.iter().map(|(w, _)| *w)))
        .expect("correction pattern is valid")
});

static NUMBER_WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&word_alternation(NUMBER_WORDS.iter().map(|(w, _)| *w)))
        .expect("number word pattern is valid")
});

static DECIMAL_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)[.,](\d+)").expect("decimal pattern is valid"));

static SPACED_PLUS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\+\s*").expect("plus pattern is valid"));

/// Maps Arabic-indic digits (U+0660 to U+0669) to ASCII.
fn ascii_digits(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{0660}'..='\u{0669}' => {
                char::from_digit(u32::from(c) - 0x0660, 10).unwrap_or(c)
            }
            _ => c,
        })
        .collect()
}

/// Normalizes a transcript for a field.
///
/// Non-numeric fields are only trimmed.
#[must_use]
pub fn normalize(transcript: &str, is_numeric: bool) -> String {
    if !is_numeric {
        return transcript.trim().to_string();
    }

    let text = transcript.trim().to_lowercase();

    let text = HUNDREDS.replace_all(&text, |caps: &Captures<'_>| match number_value(&caps[1]) {
        Some(value) => (u64::from(value) * 100).to_string(),
        None => caps[0].to_string(),
    });

    let text = ascii_digits(&text);

    let text = CORRECTION_WORDS.replace_all(&text, |caps: &Captures<'_>| {
        correction(&caps[0]).unwrap_or_default().to_string()
    });

    let text = NUMBER_WORD.replace_all(&text, |caps: &Captures<'_>| {
        number_value(&caps[0]).map_or_else(|| caps[0].to_string(), |v| v.to_string())
    });

    let text = DECIMAL_SEPARATOR.replace_all(&text, "${1}.${2}");
    let text = SPACED_PLUS.replace_all(&text, "+");

    let normalized = if text.contains('+') {
        text.into_owned()
    } else {
        text.chars()
            .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '+')
            .collect()
    };

    debug!(transcript, normalized = %normalized, "Normalized voice transcript");
    normalized
}
