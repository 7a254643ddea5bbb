use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

use super::{cut, ExtractionResult, FieldExtractor};

// hour, then an optional minute written "8:30" or "8 30", then an optional
// period qualifier ("pm", "a.m.", "de la tarde", "noche", ...). "mañana" only
// counts with its preposition; on its own it means tomorrow.
static TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:a las|a la|hora|inicio)\s*(\d{1,2})(?::(\d{2})|\s+(\d{2})\b)?\s*(a\.\s?m\.|p\.\s?m\.|(?:am|pm)\b|(?:de|en|por)\s+la\s+mañana\b|(?:(?:de|en|por)\s+la\s+)?(?:tarde|noche|madrugada)\b)?",
    )
    .expect("valid time regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Am,
    Pm,
}

impl Period {
    fn parse(raw: &str) -> Option<Self> {
        let compact: String = raw.chars().filter(|c| *c != '.' && !c.is_whitespace()).collect();
        if compact == "pm" || compact.ends_with("tarde") || compact.ends_with("noche") {
            Some(Period::Pm)
        } else if compact == "am" || compact.ends_with("mañana") || compact.ends_with("madrugada") {
            Some(Period::Am)
        } else {
            None
        }
    }
}

/// Finds the first dose time, e.g. "a las 8 de la noche" or "hora 9:30".
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeExtractor;

impl FieldExtractor for TimeExtractor {
    type Output = NaiveTime;

    fn extract(&self, text: &str) -> ExtractionResult<NaiveTime> {
        let Some(caps) = TIME_RE.captures(text) else {
            return ExtractionResult::miss(text);
        };
        let Some(whole) = caps.get(0) else {
            return ExtractionResult::miss(text);
        };

        let Ok(mut hour) = caps[1].parse::<u32>() else {
            return ExtractionResult::miss(text);
        };
        let minute = caps
            .get(2)
            .or_else(|| caps.get(3))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0);

        match caps.get(4).and_then(|m| Period::parse(m.as_str())) {
            Some(Period::Pm) if hour < 12 => hour += 12,
            Some(Period::Am) if hour == 12 => hour = 0,
            _ => {}
        }

        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(time) => ExtractionResult::found(time, cut(text, whole.range())),
            None => ExtractionResult::miss(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hh_mm(text: &str) -> Option<String> {
        TimeExtractor
            .extract(text)
            .value
            .map(|t| t.format("%H:%M").to_string())
    }

    #[test]
    fn pm_adds_twelve_hours() {
        assert_eq!(hh_mm("a las 8 pm").as_deref(), Some("20:00"));
        assert_eq!(hh_mm("a las 8 p.m.").as_deref(), Some("20:00"));
    }

    #[test]
    fn twelve_am_is_midnight() {
        assert_eq!(hh_mm("a las 12 am").as_deref(), Some("00:00"));
        assert_eq!(hh_mm("a las 12 de la madrugada").as_deref(), Some("00:00"));
    }

    #[test]
    fn colon_minutes_are_zero_padded() {
        assert_eq!(hh_mm("hora 9:30").as_deref(), Some("09:30"));
    }

    #[test]
    fn space_separated_minutes() {
        assert_eq!(hh_mm("a las 3 30 de la tarde").as_deref(), Some("15:30"));
    }

    #[test]
    fn spanish_day_phases() {
        assert_eq!(hh_mm("a las 8 de la noche").as_deref(), Some("20:00"));
        assert_eq!(hh_mm("a las 4 de la tarde").as_deref(), Some("16:00"));
        assert_eq!(hh_mm("a las 7 de la mañana").as_deref(), Some("07:00"));
        assert_eq!(hh_mm("inicio 6 por la tarde").as_deref(), Some("18:00"));
    }

    #[test]
    fn bare_manana_is_left_for_the_date() {
        let out = TimeExtractor.extract("a las 9 mañana");
        assert_eq!(out.value, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(out.remaining_text, " mañana");
        assert_eq!(hh_mm("a las 7 en la mañana").as_deref(), Some("07:00"));
    }

    #[test]
    fn no_period_is_taken_as_24h() {
        assert_eq!(hh_mm("a las 21").as_deref(), Some("21:00"));
        assert_eq!(hh_mm("a la 1").as_deref(), Some("01:00"));
    }

    #[test]
    fn pm_on_afternoon_hour_is_left_alone() {
        assert_eq!(hh_mm("a las 15 pm").as_deref(), Some("15:00"));
    }

    #[test]
    fn am_prefix_of_a_word_is_not_a_period() {
        assert_eq!(hh_mm("a las 8 amoxicilina").as_deref(), Some("08:00"));
    }

    #[test]
    fn impossible_clock_values_are_a_miss() {
        assert_eq!(hh_mm("a las 27"), None);
        assert_eq!(hh_mm("hora 9:75"), None);
    }

    #[test]
    fn match_is_removed_from_remaining_text() {
        let out = TimeExtractor.extract("paracetamol a las 8 de la noche cada 8 horas");
        assert_eq!(out.remaining_text, "paracetamol   cada 8 horas");
    }

    #[test]
    fn ahora_and_horas_do_not_trigger() {
        let out = TimeExtractor.extract("ahora 5 pastillas cada 8 horas");
        assert!(!out.is_found());
        assert_eq!(out.remaining_text, "ahora 5 pastillas cada 8 horas");
    }
}
