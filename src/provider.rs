use std::fmt;

use anyhow::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    /// General command listening on the home screen.
    Command,
    /// Open-ended dictation of a reminder.
    Dictation,
    /// A yes/no answer.
    Confirmation,
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModeKind::Command => "command",
            ModeKind::Dictation => "dictation",
            ModeKind::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

/// How the backend should listen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionMode {
    pub kind: ModeKind,
    pub continuous: bool,
    pub interim_results: bool,
    pub lang: String,
}

impl RecognitionMode {
    pub fn command(lang: &str) -> Self {
        Self {
            kind: ModeKind::Command,
            continuous: true,
            interim_results: false,
            lang: lang.to_string(),
        }
    }

    pub fn dictation(lang: &str) -> Self {
        Self {
            kind: ModeKind::Dictation,
            continuous: true,
            interim_results: true,
            lang: lang.to_string(),
        }
    }

    pub fn confirmation(lang: &str) -> Self {
        Self {
            kind: ModeKind::Confirmation,
            continuous: false,
            interim_results: false,
            lang: lang.to_string(),
        }
    }
}

/// One recognized segment as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedUtterance {
    pub text: String,
    pub is_final: bool,
}

impl RecognizedUtterance {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// A backend result event. Only entries from `result_index` on are new.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResultEvent {
    pub result_index: usize,
    pub results: Vec<RecognizedUtterance>,
}

impl ResultEvent {
    pub fn single(utterance: RecognizedUtterance) -> Self {
        Self {
            result_index: 0,
            results: vec![utterance],
        }
    }
}

/// New text carried by one result event, split by finality.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Utterance {
    pub final_text: String,
    pub interim_text: String,
}

impl From<&ResultEvent> for Utterance {
    fn from(event: &ResultEvent) -> Self {
        let mut utterance = Utterance::default();
        for result in event.results.iter().skip(event.result_index) {
            if result.is_final {
                utterance.final_text.push_str(&result.text);
            } else {
                utterance.interim_text.push_str(&result.text);
            }
        }
        utterance
    }
}

/// Whether a backend stop has already taken effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCompletion {
    /// The backend is idle again.
    Immediate,
    /// The backend will report an end event once it has released the
    /// microphone.
    Pending,
}

/// Continuous speech-to-text backend. There is one per process.
pub trait SpeechRecognizer: Send {
    fn start(&mut self, mode: &RecognitionMode) -> Result<()>;
    fn stop(&mut self) -> Result<StopCompletion>;
}
