use chrono::{DateTime, TimeZone, Timelike};
use serde::{Deserialize, Serialize};

use crate::{
    error::{VoiceError, VoiceResult},
    model::{DraftField, MedicationDraft},
};

pub const NOTHING_PENDING_TODAY: &str = "No tienes nada pendiente para hoy.";

/// A saved reminder, in the wire shape the reminder list is stored in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub dosis: String,
    /// Minutes between doses.
    pub frecuencia: u32,
    /// Next dose as epoch milliseconds.
    pub proxima_dosis: i64,
    #[serde(default)]
    pub fecha_fin: Option<i64>,
    #[serde(default)]
    pub completado: bool,
}

impl Reminder {
    /// Build a reminder whose first dose is the draft's date and time in `tz`.
    pub fn from_draft<Tz: TimeZone>(draft: &MedicationDraft, id: i64, tz: &Tz) -> VoiceResult<Self> {
        let required = [DraftField::Name, DraftField::Frequency, DraftField::Date, DraftField::Time];
        let (Some(name), Some(frequency), Some(date), Some(time)) = (
            draft.name.as_deref().filter(|n| !n.is_empty()),
            draft.frequency_minutes,
            draft.date,
            draft.time,
        ) else {
            return Err(VoiceError::IncompleteDraft(draft.missing(&required)));
        };

        let first_dose = tz
            .from_local_datetime(&date.and_time(time))
            .earliest()
            .ok_or_else(|| VoiceError::InvalidLocalTime {
                date: date.to_string(),
                time: time.format("%H:%M").to_string(),
            })?;

        Ok(Self {
            id,
            nombre: name.to_string(),
            dosis: draft.dose.clone().unwrap_or_default(),
            frecuencia: frequency,
            proxima_dosis: first_dose.timestamp_millis(),
            fecha_fin: None,
            completado: false,
        })
    }

    pub fn next_dose_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<DateTime<Tz>> {
        tz.timestamp_millis_opt(self.proxima_dosis).single()
    }
}

/// Spoken answer to "read my reminders": uncompleted doses due today.
pub fn today_summary<Tz: TimeZone>(reminders: &[Reminder], now: &DateTime<Tz>) -> String {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut due: Vec<(DateTime<Tz>, &Reminder)> = reminders
        .iter()
        .filter(|r| !r.completado)
        .filter_map(|r| r.next_dose_in(&tz).map(|at| (at, r)))
        .filter(|(at, _)| at.date_naive() == today)
        .collect();

    if due.is_empty() {
        return NOTHING_PENDING_TODAY.to_string();
    }
    due.sort_by_key(|(at, _)| at.timestamp_millis());

    let noun = if due.len() == 1 { "medicina" } else { "medicinas" };
    let items = due
        .iter()
        .map(|(at, r)| format!("{} a las {} horas", r.nombre, at.hour()))
        .collect::<Vec<_>>()
        .join(". ");
    format!("Tienes {} {noun} hoy. {items}.", due.len())
}
