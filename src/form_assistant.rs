use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::{
    error::{VoiceError, VoiceResult},
    extract::{
        DateExtractor, DoseExtractor, FieldExtractor, FrequencyExtractor, NameExtractor,
        TimeExtractor,
    },
    model::{DraftField, MedicationDraft},
    normalizer::TextNormalizer,
    settings::AssistantSettings,
};

pub const COMPLETE_PROMPT: &str = "He capturado todos los datos. ¿Deseas guardar el recordatorio?";

/// Fields found in one utterance, before they are merged into a draft.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFields {
    pub name: Option<String>,
    pub dose: Option<String>,
    pub frequency_minutes: Option<u32>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillOutcome {
    pub success: bool,
    pub missing: Vec<DraftField>,
}

/// What to say after a fill: ask for the next field or offer to save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantReply {
    Complete(&'static str),
    Ask { field: DraftField, prompt: &'static str },
}

/// Turns dictated text into draft fields.
///
/// Extraction runs as an ordered pipeline. Each step sees the text the
/// previous steps left behind; the name step takes the final residue, so it
/// must come last.
#[derive(Debug, Clone)]
pub struct FormAssistant {
    normalizer: TextNormalizer,
    order: Vec<DraftField>,
    required: Vec<DraftField>,
}

impl FormAssistant {
    pub fn new(required: Vec<DraftField>) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            order: vec![
                DraftField::Time,
                DraftField::Date,
                DraftField::Frequency,
                DraftField::Dose,
                DraftField::Name,
            ],
            required,
        }
    }

    pub fn with_order(mut self, order: Vec<DraftField>) -> VoiceResult<Self> {
        match order.iter().position(|f| *f == DraftField::Name) {
            Some(pos) if pos + 1 != order.len() => {
                return Err(VoiceError::InvalidExtractionOrder(
                    "name consumes the residual text and must run last".to_string(),
                ));
            }
            _ => {}
        }
        self.order = order;
        Ok(self)
    }

    pub fn required(&self) -> &[DraftField] {
        &self.required
    }

    /// Run the extraction pipeline over `text` without touching any draft.
    pub fn parse(&self, text: &str, today: NaiveDate) -> ParsedFields {
        let mut working = self.normalizer.normalize(text);
        let mut parsed = ParsedFields::default();

        for field in &self.order {
            match field {
                DraftField::Time => {
                    let out = TimeExtractor.extract(&working);
                    parsed.time = out.value;
                    working = out.remaining_text;
                }
                DraftField::Date => {
                    let out = DateExtractor::new(today).extract(&working);
                    parsed.date = out.value;
                    working = out.remaining_text;
                }
                DraftField::Frequency => {
                    let out = FrequencyExtractor.extract(&working);
                    parsed.frequency_minutes = out.value;
                    working = out.remaining_text;
                }
                DraftField::Dose => {
                    // The strength stays in the residue so it remains part
                    // of the name ("Paracetamol 500 mg").
                    parsed.dose = DoseExtractor.extract(&working).value;
                }
                DraftField::Name => {
                    parsed.name = NameExtractor.extract(&working).value;
                }
            }
        }

        debug!(?parsed, residue = working.trim(), "parsed dictated text");
        parsed
    }

    /// Parse `text`, merge what was found into `draft` and classify it.
    ///
    /// A missing start date defaults to `today`. Present values overwrite
    /// older ones, except the name, which keeps the first value heard.
    /// Nothing is ever cleared.
    pub fn fill_from_text(
        &self,
        draft: &mut MedicationDraft,
        text: &str,
        today: NaiveDate,
    ) -> FillOutcome {
        let parsed = self.parse(text, today);

        if !draft.has(DraftField::Name) {
            if let Some(name) = parsed.name {
                draft.name = Some(name);
            }
        }
        if parsed.dose.is_some() {
            draft.dose = parsed.dose;
        }
        if parsed.frequency_minutes.is_some() {
            draft.frequency_minutes = parsed.frequency_minutes;
        }
        if parsed.time.is_some() {
            draft.time = parsed.time;
        }
        if parsed.date.is_some() {
            draft.date = parsed.date;
        } else if draft.date.is_none() {
            draft.date = Some(today);
        }

        let missing = draft.missing(&self.required);
        FillOutcome {
            success: missing.is_empty(),
            missing,
        }
    }

    pub fn reply(&self, outcome: &FillOutcome) -> AssistantReply {
        match outcome.missing.first() {
            None => AssistantReply::Complete(COMPLETE_PROMPT),
            Some(field) => AssistantReply::Ask {
                field: *field,
                prompt: field.question(),
            },
        }
    }
}

impl Default for FormAssistant {
    fn default() -> Self {
        Self::new(AssistantSettings::default().required_fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
    }

    #[test]
    fn full_dictation_fills_every_required_field() {
        let assistant = FormAssistant::default();
        let mut draft = MedicationDraft::default();
        let outcome = assistant.fill_from_text(
            &mut draft,
            "Paracetamol 500 mg cada 8 horas empezando hoy a las 8 de la noche",
            today(),
        );

        assert_eq!(outcome, FillOutcome { success: true, missing: vec![] });
        assert_eq!(draft.name.as_deref(), Some("Paracetamol 500 mg"));
        assert_eq!(draft.frequency_minutes, Some(480));
        assert_eq!(draft.date, Some(today()));
        assert_eq!(draft.time_label().as_deref(), Some("20:00"));
        assert_eq!(draft.dose.as_deref(), Some("500 mg"));
    }

    #[test]
    fn missing_time_is_reported() {
        let assistant = FormAssistant::default();
        let mut draft = MedicationDraft::default();
        let outcome = assistant.fill_from_text(&mut draft, "Ibuprofeno cada 12 horas", today());

        assert!(!outcome.success);
        assert_eq!(outcome.missing, vec![DraftField::Time]);
        assert_eq!(draft.name.as_deref(), Some("Ibuprofeno"));
        assert_eq!(draft.date, Some(today()));
    }

    #[test]
    fn later_turns_accumulate_without_clearing() {
        let assistant = FormAssistant::default();
        let mut draft = MedicationDraft::default();
        assistant.fill_from_text(&mut draft, "Ibuprofeno cada 12 horas", today());
        let outcome = assistant.fill_from_text(&mut draft, "a las 9 de la mañana", today());

        assert!(outcome.success);
        assert_eq!(draft.name.as_deref(), Some("Ibuprofeno"));
        assert_eq!(draft.frequency_minutes, Some(720));
        assert_eq!(draft.time_label().as_deref(), Some("09:00"));
    }

    #[test]
    fn answer_to_dose_question_does_not_rename() {
        let assistant = FormAssistant::default();
        let mut draft = MedicationDraft {
            name: Some("Amoxicilina".to_string()),
            ..Default::default()
        };
        assistant.fill_from_text(&mut draft, "2 pastillas", today());
        assert_eq!(draft.name.as_deref(), Some("Amoxicilina"));
        assert_eq!(draft.dose.as_deref(), Some("2 pastillas"));
    }

    #[test]
    fn spelled_out_numbers_are_understood() {
        let assistant = FormAssistant::default();
        let mut draft = MedicationDraft::default();
        let outcome = assistant.fill_from_text(
            &mut draft,
            "Omeprazol una vez al día a las ocho y media de la mañana",
            today(),
        );
        assert!(outcome.success, "missing: {:?}", outcome.missing);
        assert_eq!(draft.name.as_deref(), Some("Omeprazol"));
        assert_eq!(draft.frequency_minutes, Some(1440));
        assert_eq!(draft.time_label().as_deref(), Some("08:30"));
    }

    #[test]
    fn morning_time_is_not_read_as_tomorrow() {
        let parsed = FormAssistant::default().parse("a las 7 de la mañana", today());
        assert_eq!(parsed.date, None);
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(7, 0, 0));
    }

    #[test]
    fn bare_manana_after_a_time_means_tomorrow() {
        let parsed =
            FormAssistant::default().parse("Paracetamol cada 8 horas a las 9 mañana", today());
        assert_eq!(parsed.time, NaiveTime::from_hms_opt(9, 0, 0));
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2026, 10, 15));
        assert_eq!(parsed.frequency_minutes, Some(480));
        assert_eq!(parsed.name.as_deref(), Some("Paracetamol"));
    }

    #[test]
    fn strict_policy_asks_for_dose() {
        let assistant = FormAssistant::new(vec![
            DraftField::Name,
            DraftField::Dose,
            DraftField::Frequency,
            DraftField::Time,
        ]);
        let mut draft = MedicationDraft::default();
        let outcome = assistant.fill_from_text(&mut draft, "Loratadina diario a las 10", today());
        assert_eq!(outcome.missing, vec![DraftField::Dose]);
        assert_eq!(
            assistant.reply(&outcome),
            AssistantReply::Ask {
                field: DraftField::Dose,
                prompt: "¿Cuál es la dosis? Por ejemplo: 500 miligramos o 1 pastilla.",
            }
        );
    }

    #[test]
    fn complete_outcome_offers_to_save() {
        let outcome = FillOutcome { success: true, missing: vec![] };
        assert_eq!(FormAssistant::default().reply(&outcome), AssistantReply::Complete(COMPLETE_PROMPT));
    }

    #[test]
    fn name_must_run_last() {
        let err = FormAssistant::default()
            .with_order(vec![DraftField::Name, DraftField::Time])
            .unwrap_err();
        assert!(matches!(err, VoiceError::InvalidExtractionOrder(_)));

        assert!(FormAssistant::default()
            .with_order(vec![DraftField::Frequency, DraftField::Time, DraftField::Name])
            .is_ok());
    }
}
