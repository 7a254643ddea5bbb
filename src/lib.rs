//! Voice interaction for a Spanish medication-reminder app: a turn-taking
//! conversation over continuous speech recognition, and a parser that turns
//! dictated text into reminder fields.

pub mod commands;
pub mod error;
pub mod extract;
pub mod form_assistant;
pub mod model;
pub mod normalizer;
pub mod prompts;
pub mod provider;
pub mod reminder;
pub mod services;
pub mod session;
pub mod settings;
pub mod state_machine;
pub mod store;

pub use error::{RecognitionError, VoiceError, VoiceResult};
pub use form_assistant::{AssistantReply, FillOutcome, FormAssistant};
pub use model::{ConversationState, DraftField, MedicationDraft};
pub use normalizer::TextNormalizer;
pub use reminder::Reminder;
pub use session::RecognitionSession;
pub use settings::AssistantSettings;
pub use state_machine::{Collaborators, ConversationController};
