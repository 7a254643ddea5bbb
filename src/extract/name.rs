use once_cell::sync::Lazy;
use regex::Regex;

use super::{ExtractionResult, FieldExtractor};

/// Command and connector words that are never part of a medication name.
const STOP_PHRASES: &[&str] = &[
    "con frecuencia de",
    "a partir de",
    "el día",
    "el dia",
    "la fecha",
    "agregar",
    "añadir",
    "anadir",
    "nuevo",
    "nueva",
    "recordatorio",
    "recordar",
    "medicamento",
    "medicina",
    "tomar",
    "iniciar",
    "empezando",
    "empezar",
    "comenzando",
    "comenzar",
    "desde",
    "cada",
];

static STOP_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = STOP_PHRASES
        .iter()
        .map(|p| p.replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"\b(?:{alternation})\b")).expect("valid stop phrase regex")
});
static PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,;:!?¡¿]|\.(?:\s|$)").expect("valid punctuation regex"));
static LEADING_CONNECTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:(?:de|del|y|a|al|con|el|la|para)\s+)+").expect("valid connector regex"));
static TRAILING_CONNECTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\s+(?:de|del|y|a|al|con|el|la|para))+$").expect("valid connector regex"));

/// Takes whatever the other extractors left behind as the medication name.
///
/// Runs last. Command words and dangling connectors are dropped and the
/// first letter is capitalized; anything else that survives is the name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameExtractor;

impl FieldExtractor for NameExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> ExtractionResult<String> {
        let cleaned = STOP_RE.replace_all(text, " ");
        let cleaned = PUNCTUATION_RE.replace_all(&cleaned, " ");
        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        let trimmed = LEADING_CONNECTOR_RE.replace(&collapsed, "");
        let trimmed = TRAILING_CONNECTOR_RE.replace(&trimmed, "");
        let name = capitalize(trimmed.trim());

        if name.is_empty() {
            ExtractionResult::miss(text)
        } else {
            // The name is the residue itself; nothing is left after it.
            ExtractionResult::found(name, String::new())
        }
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn name(text: &str) -> Option<String> {
        NameExtractor.extract(text).value
    }

    #[test]
    fn residue_becomes_capitalized_name() {
        assert_eq!(name("paracetamol 500 mg    empezando  ").as_deref(), Some("Paracetamol 500 mg"));
    }

    #[test]
    fn command_words_are_dropped() {
        assert_eq!(
            name("agregar nuevo recordatorio ibuprofeno tomar").as_deref(),
            Some("Ibuprofeno")
        );
    }

    #[test]
    fn punctuation_and_dangling_connectors_are_dropped() {
        assert_eq!(name("paracetamol de 500, ,  ").as_deref(), Some("Paracetamol de 500"));
        assert_eq!(name("el omeprazol y ").as_deref(), Some("Omeprazol"));
    }

    #[test]
    fn decimal_points_survive() {
        assert_eq!(name("jarabe 2.5 ml.").as_deref(), Some("Jarabe 2.5 ml"));
    }

    #[test]
    fn accented_first_letter() {
        assert_eq!(name("ácido fólico").as_deref(), Some("Ácido fólico"));
    }

    #[test]
    fn only_stop_words_is_not_a_name() {
        let out = NameExtractor.extract("agregar recordatorio  cada ");
        assert!(!out.is_found());
        assert_eq!(out.remaining_text, "agregar recordatorio  cada ");
    }
}
