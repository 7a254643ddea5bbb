use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    model::MedicationDraft,
    reminder::Reminder,
    services::{PreferenceStore, ReminderRepository},
    settings::AssistantSettings,
};

pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn load(&self) -> Result<AssistantSettings> {
        if !self.path.exists() {
            return Ok(AssistantSettings::default());
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading settings file {}", self.path.display()))?;
        let settings: AssistantSettings =
            serde_json::from_str(&raw).context("failed parsing settings json")?;
        Ok(settings)
    }

    pub fn save(&self, settings: &AssistantSettings) -> Result<()> {
        write_json(&self.path, settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct VoicePreferences {
    #[serde(rename = "voiceHelp", default, skip_serializing_if = "Option::is_none")]
    voice_help: Option<bool>,
}

/// `voiceHelp` preference kept in a JSON file.
pub struct FilePreferenceStore {
    path: PathBuf,
    cached: VoicePreferences,
}

impl FilePreferenceStore {
    pub fn open(path: PathBuf) -> Result<Self> {
        let cached = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed reading preferences file {}", path.display()))?;
            serde_json::from_str(&raw).context("failed parsing preferences json")?
        } else {
            VoicePreferences::default()
        };
        Ok(Self { path, cached })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn voice_help(&self) -> Option<bool> {
        self.cached.voice_help
    }

    fn set_voice_help(&mut self, enabled: bool) -> Result<()> {
        self.cached.voice_help = Some(enabled);
        debug!(enabled, path = %self.path.display(), "persisting voice preference");
        write_json(&self.path, &self.cached)
    }
}

/// Reminder list kept as a JSON array, newest last.
pub struct FileReminderRepository {
    path: PathBuf,
}

impl FileReminderRepository {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ReminderRepository for FileReminderRepository {
    fn save(&mut self, draft: &MedicationDraft) -> Result<()> {
        let mut reminders = self.reminders()?;
        let now = Local::now();
        let reminder = Reminder::from_draft(draft, now.timestamp_millis(), &Local)?;
        debug!(id = reminder.id, name = %reminder.nombre, "storing reminder");
        reminders.push(reminder);
        write_json(&self.path, &reminders)
    }

    fn reminders(&self) -> Result<Vec<Reminder>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("failed reading reminders file {}", self.path.display()))?;
        serde_json::from_str(&raw).context("failed parsing reminders json")
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let Some(parent) = path.parent() else {
        anyhow::bail!("path {} has no parent", path.display())
    };
    fs::create_dir_all(parent)?;
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}
