//! Spoken command vocabulary.
//!
//! Matching is on whole words after lowercasing, so "sí" matches but
//! "sigues" does not.

pub const ADD_WORDS: &[&str] = &[
    "agregar", "agrega", "añadir", "añade", "anadir", "nuevo", "nueva", "crear", "crea",
    "registrar", "registra",
];
pub const SETTINGS_WORDS: &[&str] = &[
    "ajustes", "ajuste", "perfil", "configuración", "configuracion", "opciones",
];
pub const LIST_WORDS: &[&str] = &[
    "escuchar", "escucha", "leer", "lee", "recordatorios", "pendientes", "lista",
];
pub const AFFIRMATIVE_WORDS: &[&str] = &[
    "sí", "si", "claro", "aquí", "aqui", "vale", "ok", "okay", "estoy", "sigo", "bueno",
];
pub const FORM_CANCEL_WORDS: &[&str] = &["cancelar", "cancela", "volver", "vuelve", "atrás", "atras"];
pub const FORM_SAVE_WORDS: &[&str] = &["guardar", "guarda"];
pub const FORM_DICTATE_WORDS: &[&str] = &["dictar", "escribir"];
const FINISHED_WORDS: &[&str] = &["sí", "si", "ya", "listo", "claro", "vale"];
const FINISHED_PREFIXES: &[&str] = &["termin"];
const NOT_FINISHED_WORDS: &[&str] = &["no", "falta", "faltan", "espera", "espérate", "esperate"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceCommand {
    AddReminder,
    OpenSettings,
    ReadReminders,
}

impl VoiceCommand {
    /// First matching command, checked in the order add, settings, list.
    pub fn parse(text: &str) -> Option<Self> {
        let words = words(text);
        if contains_any(&words, ADD_WORDS) {
            Some(VoiceCommand::AddReminder)
        } else if contains_any(&words, SETTINGS_WORDS) {
            Some(VoiceCommand::OpenSettings)
        } else if contains_any(&words, LIST_WORDS) {
            Some(VoiceCommand::ReadReminders)
        } else {
            None
        }
    }
}

/// Spoken control of the add-reminder form while dictating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCommand {
    Cancel,
    Save,
    Dictate,
}

impl FormCommand {
    /// Checked in the order cancel, save, dictate.
    pub fn parse(text: &str) -> Option<Self> {
        let words = words(text);
        if contains_any(&words, FORM_CANCEL_WORDS) {
            Some(FormCommand::Cancel)
        } else if contains_any(&words, FORM_SAVE_WORDS) {
            Some(FormCommand::Save)
        } else if contains_any(&words, FORM_DICTATE_WORDS) {
            Some(FormCommand::Dictate)
        } else {
            None
        }
    }
}

/// Answer to "¿Sigues ahí?".
pub fn is_affirmative(text: &str) -> bool {
    contains_any(&words(text), AFFIRMATIVE_WORDS)
}

/// Answer to "¿Ya terminaste?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishedAnswer {
    Yes,
    No,
    Unclear,
}

impl FinishedAnswer {
    /// "No" wins over "yes", so "ya no" or "no, falta la hora" keep dictating.
    pub fn classify(text: &str) -> Self {
        let words = words(text);
        if contains_any(&words, NOT_FINISHED_WORDS) {
            FinishedAnswer::No
        } else if contains_any(&words, FINISHED_WORDS)
            || words
                .iter()
                .any(|w| FINISHED_PREFIXES.iter().any(|p| w.starts_with(p)))
        {
            FinishedAnswer::Yes
        } else {
            FinishedAnswer::Unclear
        }
    }
}

fn words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn contains_any(words: &[String], vocabulary: &[&str]) -> bool {
    words.iter().any(|w| vocabulary.contains(&w.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_synonyms() {
        for text in ["Agregar recordatorio", "añadir", "quiero uno nuevo", "registrar medicina"] {
            assert_eq!(VoiceCommand::parse(text), Some(VoiceCommand::AddReminder), "{text}");
        }
    }

    #[test]
    fn add_wins_over_list_words() {
        assert_eq!(
            VoiceCommand::parse("agregar recordatorios"),
            Some(VoiceCommand::AddReminder)
        );
    }

    #[test]
    fn settings_and_list() {
        assert_eq!(VoiceCommand::parse("abre mi perfil"), Some(VoiceCommand::OpenSettings));
        assert_eq!(VoiceCommand::parse("Configuración"), Some(VoiceCommand::OpenSettings));
        assert_eq!(
            VoiceCommand::parse("escuchar recordatorios"),
            Some(VoiceCommand::ReadReminders)
        );
        assert_eq!(VoiceCommand::parse("¿qué tengo pendientes?"), Some(VoiceCommand::ReadReminders));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(VoiceCommand::parse("qué hora es"), None);
    }

    #[test]
    fn form_commands() {
        assert_eq!(FormCommand::parse("Cancelar"), Some(FormCommand::Cancel));
        assert_eq!(FormCommand::parse("quiero volver atrás"), Some(FormCommand::Cancel));
        assert_eq!(FormCommand::parse("guardar"), Some(FormCommand::Save));
        assert_eq!(FormCommand::parse("dictar otra vez"), Some(FormCommand::Dictate));
        assert_eq!(FormCommand::parse("cancelar, no guardar"), Some(FormCommand::Cancel));
        assert_eq!(FormCommand::parse("Paracetamol cada 8 horas"), None);
        assert_eq!(FormCommand::parse("guardarropa"), None);
    }

    #[test]
    fn affirmatives_match_whole_words() {
        assert!(is_affirmative("Sí, aquí estoy"));
        assert!(is_affirmative("ok"));
        assert!(!is_affirmative("sigues"));
        assert!(!is_affirmative("nada"));
    }

    #[test]
    fn finished_answers() {
        assert_eq!(FinishedAnswer::classify("sí, ya terminé"), FinishedAnswer::Yes);
        assert_eq!(FinishedAnswer::classify("Terminado"), FinishedAnswer::Yes);
        assert_eq!(FinishedAnswer::classify("no, falta la hora"), FinishedAnswer::No);
        assert_eq!(FinishedAnswer::classify("ya no"), FinishedAnswer::No);
        assert_eq!(FinishedAnswer::classify("paracetamol"), FinishedAnswer::Unclear);
    }
}
