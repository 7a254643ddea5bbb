use once_cell::sync::Lazy;
use regex::Regex;

use super::{cut, ExtractionResult, FieldExtractor};

static DOSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(\d+(?:[.,]\d+)?)\s*(mg|miligramos?|gr|gramos?|ml|mililitros?|pastillas?|tabletas?|c[aá]psulas?|gotas?)\b",
    )
    .expect("valid dose regex")
});

/// Finds an amount with a unit, e.g. "500 mg" or "2 pastillas".
#[derive(Debug, Clone, Copy, Default)]
pub struct DoseExtractor;

impl FieldExtractor for DoseExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> ExtractionResult<String> {
        match DOSE_RE.find(text) {
            Some(m) => ExtractionResult::found(m.as_str().to_string(), cut(text, m.range())),
            None => ExtractionResult::miss(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn amount_and_unit() {
        let out = DoseExtractor.extract("paracetamol 500 mg cada 8 horas");
        assert_eq!(out.value.as_deref(), Some("500 mg"));
        assert_eq!(out.remaining_text, "paracetamol   cada 8 horas");
    }

    #[test]
    fn decimal_amounts_and_plural_units() {
        assert_eq!(DoseExtractor.extract("jarabe 2.5 ml").value.as_deref(), Some("2.5 ml"));
        assert_eq!(DoseExtractor.extract("2 pastillas").value.as_deref(), Some("2 pastillas"));
        assert_eq!(DoseExtractor.extract("1 cápsula").value.as_deref(), Some("1 cápsula"));
    }

    #[test]
    fn bare_numbers_are_not_doses() {
        assert!(!DoseExtractor.extract("paracetamol de 500").is_found());
        assert!(!DoseExtractor.extract("cada 8 horas").is_found());
    }
}
