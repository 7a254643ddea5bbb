use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationState {
    Idle,
    ListeningCommand,
    AwaitingConfirmation,
    Dictating,
    AwaitingDictationConfirmation,
}

impl ConversationState {
    pub fn label(&self) -> &'static str {
        match self {
            ConversationState::Idle => "Idle",
            ConversationState::ListeningCommand => "ListeningCommand",
            ConversationState::AwaitingConfirmation => "AwaitingConfirmation",
            ConversationState::Dictating => "Dictating",
            ConversationState::AwaitingDictationConfirmation => "AwaitingDictationConfirmation",
        }
    }

    pub fn is_dictation(&self) -> bool {
        matches!(
            self,
            ConversationState::Dictating | ConversationState::AwaitingDictationConfirmation
        )
    }
}

/// A field of the reminder being dictated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftField {
    Name,
    Dose,
    Frequency,
    Date,
    Time,
}

impl DraftField {
    /// Spoken Spanish label, used when listing missing fields.
    pub fn spoken_label(&self) -> &'static str {
        match self {
            DraftField::Name => "nombre",
            DraftField::Dose => "dosis",
            DraftField::Frequency => "frecuencia",
            DraftField::Date => "fecha",
            DraftField::Time => "hora",
        }
    }

    /// The question asked when this field is the first one missing.
    pub fn question(&self) -> &'static str {
        match self {
            DraftField::Name => "¿Cuál es el nombre del medicamento?",
            DraftField::Dose => "¿Cuál es la dosis? Por ejemplo: 500 miligramos o 1 pastilla.",
            DraftField::Frequency => "¿Cada cuánto tiempo debes tomarlo?",
            DraftField::Date => "¿Qué día empiezas a tomarlo?",
            DraftField::Time => "¿A qué hora es la primera toma?",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftField::Name => "name",
            DraftField::Dose => "dose",
            DraftField::Frequency => "frequency",
            DraftField::Date => "date",
            DraftField::Time => "time",
        };
        f.write_str(name)
    }
}

/// Structured reminder fields collected over one dictation.
///
/// Every present field is already normalized: the date is a calendar date,
/// the time a wall-clock time, the frequency a number of minutes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "hh_mm")]
    pub time: Option<NaiveTime>,
}

impl MedicationDraft {
    pub fn has(&self, field: DraftField) -> bool {
        match field {
            DraftField::Name => self.name.as_deref().is_some_and(|n| !n.is_empty()),
            DraftField::Dose => self.dose.as_deref().is_some_and(|d| !d.is_empty()),
            DraftField::Frequency => self.frequency_minutes.is_some(),
            DraftField::Date => self.date.is_some(),
            DraftField::Time => self.time.is_some(),
        }
    }

    /// Fields from `required`, in order, that are still absent.
    pub fn missing(&self, required: &[DraftField]) -> Vec<DraftField> {
        required.iter().copied().filter(|f| !self.has(*f)).collect()
    }

    /// `HH:MM` rendering of the start time.
    pub fn time_label(&self) -> Option<String> {
        self.time.map(|t| t.format("%H:%M").to_string())
    }
}

mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        raw.map(|s| NaiveTime::parse_from_str(&s, "%H:%M").map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Text captured on the dictation surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictationTranscript {
    pub final_text: String,
    pub partial_text: String,
    // Byte offset into `final_text` up to which a submit already parsed.
    parsed_len: usize,
}

impl DictationTranscript {
    pub fn append_final(&mut self, fragment: &str) {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return;
        }
        if !self.final_text.is_empty() {
            self.final_text.push(' ');
        }
        self.final_text.push_str(fragment);
        self.partial_text.clear();
    }

    /// What the dictation surface shows: committed text plus the live guess.
    pub fn live_text(&self) -> String {
        let partial = self.partial_text.trim();
        if partial.is_empty() {
            self.final_text.clone()
        } else if self.final_text.is_empty() {
            partial.to_string()
        } else {
            format!("{} {}", self.final_text, partial)
        }
    }

    /// Final text added since the last `mark_parsed`.
    pub fn unparsed(&self) -> &str {
        self.final_text.get(self.parsed_len..).unwrap_or_default().trim()
    }

    pub fn mark_parsed(&mut self) {
        self.parsed_len = self.final_text.len();
    }

    pub fn clear(&mut self) {
        self.final_text.clear();
        self.partial_text.clear();
        self.parsed_len = 0;
    }
}
