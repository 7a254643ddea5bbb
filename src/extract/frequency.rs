use once_cell::sync::Lazy;
use regex::Regex;

use super::{cut, ExtractionResult, FieldExtractor};

pub const EVERY_MINUTE: u32 = 1;
pub const EVERY_8_HOURS: u32 = 480;
pub const EVERY_12_HOURS: u32 = 720;
pub const DAILY: u32 = 1440;

struct FrequencyRule {
    minutes: u32,
    /// Substrings that select this rule.
    triggers: &'static [&'static str],
    /// Span to blank out once the rule is selected.
    strip: Regex,
}

fn rule(minutes: u32, triggers: &'static [&'static str], body: &str) -> FrequencyRule {
    let pattern = format!(r"(?:(?:cada|con frecuencia de)\s*)?(?:{body})");
    FrequencyRule {
        minutes,
        triggers,
        strip: Regex::new(&pattern).expect("valid frequency regex"),
    }
}

// "minuto" / "prueba" schedule a reminder every minute. It is a testing
// shortcut kept as a recognised phrase.
static RULES: Lazy<Vec<FrequencyRule>> = Lazy::new(|| {
    vec![
        rule(EVERY_8_HOURS, &["8 hora", "8 hrs"], r"\b8\s*(?:horas?|hrs)\b"),
        rule(EVERY_12_HOURS, &["12 hora", "12 hrs"], r"\b12\s*(?:horas?|hrs)\b"),
        rule(
            DAILY,
            &["24 hora", "una vez", "1 vez", "diario", "cada día", "cada dia"],
            r"\b24\s*(?:horas?|hrs)\b|\b(?:una|1)\s+vez(?:\s+al\s+d[ií]a)?\b|\bdiari[oa](?:mente)?\b|\bcada\s+d[ií]a\b",
        ),
        rule(EVERY_MINUTE, &["minuto", "prueba"], r"\b(?:1\s+)?minutos?\b|\bprueba\b"),
    ]
});

/// Maps a spoken repetition ("cada 8 horas", "una vez al día") to minutes.
///
/// The rule is chosen by plain substring presence, first rule wins, so a
/// single utterance yields at most one frequency.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrequencyExtractor;

impl FieldExtractor for FrequencyExtractor {
    type Output = u32;

    fn extract(&self, text: &str) -> ExtractionResult<u32> {
        let Some(rule) = RULES
            .iter()
            .find(|rule| rule.triggers.iter().any(|t| text.contains(t)))
        else {
            return ExtractionResult::miss(text);
        };

        let remaining = match rule.strip.find(text) {
            Some(m) if !m.is_empty() => cut(text, m.range()),
            _ => text.to_string(),
        };
        ExtractionResult::found(rule.minutes, remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn every_eight_hours() {
        let out = FrequencyExtractor.extract("cada 8 horas");
        assert_eq!(out.value, Some(EVERY_8_HOURS));
        assert_eq!(out.remaining_text.trim(), "");
    }

    #[test]
    fn every_twelve_hrs() {
        assert_eq!(FrequencyExtractor.extract("cada 12 hrs").value, Some(EVERY_12_HOURS));
    }

    #[test]
    fn once_a_day() {
        let out = FrequencyExtractor.extract("una vez al día");
        assert_eq!(out.value, Some(DAILY));
        assert_eq!(out.remaining_text.trim(), "");
        assert_eq!(FrequencyExtractor.extract("1 vez al día").value, Some(DAILY));
        assert_eq!(FrequencyExtractor.extract("tomar diario").value, Some(DAILY));
        assert_eq!(FrequencyExtractor.extract("cada 24 horas").value, Some(DAILY));
    }

    #[test]
    fn test_phrase_means_every_minute() {
        assert_eq!(FrequencyExtractor.extract("prueba").value, Some(EVERY_MINUTE));
        assert_eq!(FrequencyExtractor.extract("cada minuto").value, Some(EVERY_MINUTE));
    }

    #[test]
    fn prefix_is_stripped_with_the_interval() {
        let out = FrequencyExtractor.extract("omeprazol con frecuencia de 12 horas");
        assert_eq!(out.remaining_text, "omeprazol  ");
    }

    #[test]
    fn first_rule_wins() {
        assert_eq!(
            FrequencyExtractor.extract("cada 8 horas o cada 12 horas").value,
            Some(EVERY_8_HOURS)
        );
    }

    #[test]
    fn unmatched_text_is_stable() {
        let text = "paracetamol 500 mg";
        let first = FrequencyExtractor.extract(text);
        assert!(!first.is_found());
        let second = FrequencyExtractor.extract(&first.remaining_text);
        assert!(!second.is_found());
        assert_eq!(second.remaining_text, text);
    }
}
