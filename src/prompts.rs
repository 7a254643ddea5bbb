//! Fixed Spanish phrases spoken by the assistant.

pub const WELCOME: &str =
    "Estás en el inicio. Puedes decir: 'ajustes', 'agregar recordatorio' o 'escuchar recordatorios'.";
pub const NOT_UNDERSTOOD: &str = "No te he entendido.";
pub const DICTATION_EXAMPLE: &str = "Dime el nombre, dosis, frecuencia, fecha y hora. Por ejemplo: Paracetamol de 500, cada 8 horas, empezando hoy a las 4 de la tarde.";
pub const STILL_THERE: &str = "¿Sigues ahí?";
pub const VOICE_ACTIVATED: &str = "Ayuda activada.";
pub const OPENING_ADD: &str = "Abriendo pantalla para añadir.";
pub const OPENING_SETTINGS: &str = "Abriendo tus ajustes.";
pub const ANYTHING_ELSE: &str = "¿Deseas algo más?";
pub const FINISHED_QUESTION: &str = "¿Ya terminaste?";
pub const REPEAT_EXAMPLE: &str = "Entendido. Repito el ejemplo:";
pub const STILL_LISTENING: &str = "Sigo escuchando datos.";
pub const CANCELLING: &str = "Cancelando.";
pub const CANCELLED_BY_INACTIVITY: &str = "Se ha cancelado por inactividad.";
pub const SAVING: &str = "Datos completos. Guardando recordatorio.";
pub const READ_FAILED: &str = "No pude leer tus recordatorios.";
pub const SAVE_FAILED: &str = "No pude guardar el recordatorio.";
pub const NETWORK_LOST: &str =
    "No hay conexión para reconocer tu voz. La ayuda por voz se ha desactivado.";
pub const PERMISSION_DENIED: &str =
    "No tengo permiso para usar el micrófono. La ayuda por voz no está disponible.";

/// "Falta información: nombre, hora. ¿Cuál es el nombre del medicamento?"
pub fn missing_fields(labels: &[&str], question: &str) -> String {
    format!("Falta información: {}. {question}", labels.join(", "))
}
