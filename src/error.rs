use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{model::DraftField, provider::ModeKind};

#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("recognition session already running in {0} mode")]
    SessionBusy(ModeKind),

    #[error("speech recognition backend failed: {0}")]
    Backend(String),

    #[error("draft is missing required fields: {0:?}")]
    IncompleteDraft(Vec<DraftField>),

    #[error("invalid extraction order: {0}")]
    InvalidExtractionOrder(String),

    #[error("{date} {time} does not exist in the local time zone")]
    InvalidLocalTime { date: String, time: String },
}

pub type VoiceResult<T> = Result<T, VoiceError>;

impl VoiceError {
    pub(crate) fn backend(err: anyhow::Error) -> Self {
        VoiceError::Backend(format!("{err:#}"))
    }
}

/// Error codes reported by the speech-to-text backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    NoSpeech,
    Aborted,
    Network,
    NotAllowed,
    ServiceNotAllowed,
    AudioCapture,
    LanguageNotSupported,
    Other(String),
}

impl RecognitionError {
    pub fn code(&self) -> &str {
        match self {
            RecognitionError::NoSpeech => "no-speech",
            RecognitionError::Aborted => "aborted",
            RecognitionError::Network => "network",
            RecognitionError::NotAllowed => "not-allowed",
            RecognitionError::ServiceNotAllowed => "service-not-allowed",
            RecognitionError::AudioCapture => "audio-capture",
            RecognitionError::LanguageNotSupported => "language-not-supported",
            RecognitionError::Other(code) => code,
        }
    }

    /// Errors after which listening can never succeed without user action.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RecognitionError::NotAllowed
                | RecognitionError::ServiceNotAllowed
                | RecognitionError::AudioCapture
                | RecognitionError::LanguageNotSupported
        )
    }
}

impl FromStr for RecognitionError {
    type Err = std::convert::Infallible;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(match code.trim() {
            "no-speech" => RecognitionError::NoSpeech,
            "aborted" => RecognitionError::Aborted,
            "network" => RecognitionError::Network,
            "not-allowed" => RecognitionError::NotAllowed,
            "service-not-allowed" => RecognitionError::ServiceNotAllowed,
            "audio-capture" => RecognitionError::AudioCapture,
            "language-not-supported" => RecognitionError::LanguageNotSupported,
            other => RecognitionError::Other(other.to_string()),
        })
    }
}

impl fmt::Display for RecognitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
