//! Text normalization for dictated Spanish.
//!
//! Speech recognizers are inconsistent about spelling numbers out ("ocho")
//! versus writing digits ("8"). Every extractor downstream matches digits, so
//! this pass lowercases the text and rewrites number words and the
//! "y media" / "y cuarto" time idioms into digits.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

const NUMBER_WORDS: &[(&str, &str)] = &[
    ("una", "1"),
    ("uno", "1"),
    ("dos", "2"),
    ("tres", "3"),
    ("cuatro", "4"),
    ("cinco", "5"),
    ("seis", "6"),
    ("siete", "7"),
    ("ocho", "8"),
    ("nueve", "9"),
    ("diez", "10"),
    ("once", "11"),
    ("doce", "12"),
    ("trece", "13"),
    ("catorce", "14"),
    ("quince", "15"),
    ("dieciséis", "16"),
    ("dieciseis", "16"),
    ("diecisiete", "17"),
    ("dieciocho", "18"),
    ("diecinueve", "19"),
    ("veinte", "20"),
    ("veintiuno", "21"),
    ("veintiuna", "21"),
    ("veintidós", "22"),
    ("veintidos", "22"),
    ("veintitrés", "23"),
    ("veintitres", "23"),
    ("veinticuatro", "24"),
    ("veinticinco", "25"),
    ("veintiséis", "26"),
    ("veintiseis", "26"),
    ("veintisiete", "27"),
    ("veintiocho", "28"),
    ("veintinueve", "29"),
    ("treinta", "30"),
    ("cuarenta", "40"),
    ("cincuenta", "50"),
    ("media", "30"),
    ("cuarto", "15"),
];

static HALF_PAST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\by\s+media\b").expect("valid half-past regex"));
static QUARTER_PAST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\by\s+cuarto\b").expect("valid quarter-past regex"));
static NUMBER_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = NUMBER_WORDS
        .iter()
        .map(|(word, _)| *word)
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("valid number word regex")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Lowercase `raw` and replace spelled-out numbers with digits.
    ///
    /// Only whole words are replaced, so "dosis" keeps its "dos".
    pub fn normalize(&self, raw: &str) -> String {
        let lowered = raw.to_lowercase();
        let text = HALF_PAST_RE.replace_all(&lowered, "30");
        let text = QUARTER_PAST_RE.replace_all(&text, "15");
        NUMBER_WORD_RE
            .replace_all(&text, |caps: &Captures| digits_for(&caps[0]).to_string())
            .into_owned()
    }
}

fn digits_for(word: &str) -> &'static str {
    NUMBER_WORDS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, digits)| *digits)
        .unwrap_or_default()
}
