use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate};

use crate::{model::MedicationDraft, reminder::Reminder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceId(pub u64);

/// Text-to-speech output. The host reports completion through
/// `ConversationController::on_speech_finished` exactly once per `speak`,
/// or never if the utterance was cancelled.
pub trait SpeechOutput: Send {
    fn speak(&mut self, id: UtteranceId, text: &str) -> Result<()>;
    /// Drop pending and in-progress speech immediately.
    fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    Inactivity,
    DictationSilence,
    NetworkRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub generation: u64,
}

/// One-shot timers on the host event loop. A fired timer is delivered back
/// through `ConversationController::on_timer` with its token.
pub trait TimerScheduler: Send {
    fn schedule(&mut self, token: TimerToken, after: Duration);
    fn cancel(&mut self, token: TimerToken);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisableReason {
    Inactivity,
    NetworkUnavailable,
    PermissionDenied(String),
}

/// The non-voice UI around the assistant.
pub trait VoiceHost: Send {
    fn show_add_form(&mut self);
    fn open_dictation_surface(&mut self);
    fn update_transcript(&mut self, text: &str);
    fn close_dictation_surface(&mut self);
    fn open_settings(&mut self);
    fn listening_changed(&mut self, listening: bool);
    fn voice_disabled(&mut self, reason: &DisableReason);
}

pub trait ReminderRepository: Send {
    fn save(&mut self, draft: &MedicationDraft) -> Result<()>;
    fn reminders(&self) -> Result<Vec<Reminder>>;
}

/// The persisted `voiceHelp` preference. `None` means the user was never
/// asked.
pub trait PreferenceStore: Send {
    fn voice_help(&self) -> Option<bool>;
    fn set_voice_help(&mut self, enabled: bool) -> Result<()>;
}

pub trait Clock: Send {
    fn now(&self) -> DateTime<Local>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
