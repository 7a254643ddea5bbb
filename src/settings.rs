use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::DraftField;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    pub lang: String,
    pub inactivity_timeout_ms: u64,
    pub dictation_silence_ms: u64,
    pub network_retry_delay_ms: u64,
    pub max_network_retries: u32,
    /// Fields that must be present before a draft can be saved, in the
    /// order they are asked for.
    pub required_fields: Vec<DraftField>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            lang: "es-ES".to_string(),
            inactivity_timeout_ms: 15_000,
            dictation_silence_ms: 15_000,
            network_retry_delay_ms: 4_000,
            max_network_retries: 3,
            required_fields: vec![DraftField::Name, DraftField::Time, DraftField::Frequency],
        }
    }
}

impl AssistantSettings {
    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_millis(self.inactivity_timeout_ms)
    }

    pub fn dictation_silence(&self) -> Duration {
        Duration::from_millis(self.dictation_silence_ms)
    }

    pub fn network_retry_delay(&self) -> Duration {
        Duration::from_millis(self.network_retry_delay_ms)
    }
}
