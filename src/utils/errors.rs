//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del cliente del back-office
//! y su conversión a mensajes mostrables en línea.

use reqwest::StatusCode;
use thiserror::Error;

/// Mensaje genérico cuando el servidor no responde
pub const CONNECTION_ERROR_MESSAGE: &str = "Error de conexión con el servidor";

/// Mensaje de respaldo cuando la respuesta de error no trae `error` ni `message`
pub const FALLBACK_ERROR_MESSAGE: &str = "Error al procesar la solicitud";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Duplicate {field}: {message}")]
    Duplicate { field: String, message: String },

    #[error("Referenced by {count} boletas: {message}")]
    Referenced { count: u64, message: String },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// Mensaje que se muestra en línea al usuario
    pub fn user_message(&self) -> String {
        match self {
            AppError::Connection(_) => CONNECTION_ERROR_MESSAGE.to_string(),
            AppError::Http { message, .. } => message.clone(),
            AppError::Duplicate { message, .. } => message.clone(),
            AppError::Referenced { message, .. } => message.clone(),
            AppError::PermissionDenied(notice) => notice.clone(),
            AppError::Validation(errors) => match first_invalid_field(errors, &[]) {
                Some(field) => format!("Revise el campo {}", field),
                None => "Datos del formulario inválidos".to_string(),
            },
            AppError::Decode(_) => FALLBACK_ERROR_MESSAGE.to_string(),
            AppError::Config(msg) => msg.clone(),
            AppError::Database(_) => "Error de base de datos".to_string(),
        }
    }

    /// Campo del formulario que debe recibir el foco, si el error apunta a uno
    pub fn focus_field(&self, field_order: &[&'static str]) -> Option<String> {
        match self {
            AppError::Duplicate { field, .. } => Some(field.clone()),
            AppError::Validation(errors) => first_invalid_field(errors, field_order),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            AppError::Decode(e.to_string())
        } else {
            AppError::Connection(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Decode(e.to_string())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Clasifica una respuesta de error del servidor.
///
/// Un 400/409 que menciona `existe`, `duplic` o el propio `key_field` es un
/// conflicto de clave natural y se asocia a `key_field`; el resto queda como
/// error HTTP con el mensaje del servidor.
pub fn classify_rejection(status: StatusCode, message: String, key_field: Option<&str>) -> AppError {
    let lower = message.to_lowercase();
    let is_conflict = status == StatusCode::BAD_REQUEST || status == StatusCode::CONFLICT;
    let mentions_duplicate = lower.contains("existe") || lower.contains("duplic");
    let names_field = |field: &str| lower.contains(&field.to_lowercase());

    match key_field {
        Some(field) if is_conflict && (mentions_duplicate || names_field(field)) => AppError::Duplicate {
            field: field.to_string(),
            message,
        },
        _ => AppError::Http {
            status: status.as_u16(),
            message,
        },
    }
}

/// Devuelve el primer campo inválido respetando el orden del formulario;
/// si ninguno coincide, el primero en orden alfabético.
fn first_invalid_field(
    errors: &validator::ValidationErrors,
    field_order: &[&'static str],
) -> Option<String> {
    let invalid = errors.field_errors();
    field_order
        .iter()
        .find(|field| invalid.contains_key(*field))
        .map(|field| field.to_string())
        .or_else(|| {
            let mut names: Vec<&&str> = invalid.keys().collect();
            names.sort();
            names.first().map(|field| field.to_string())
        })
}

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.add_param("message".into(), &message);

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de permiso denegado
pub fn permission_denied(action_label: &str, entity_label: &str) -> AppError {
    AppError::PermissionDenied(format!("Permiso Denegado: {} {}", action_label, entity_label))
}

/// Función helper para crear errores de configuración
pub fn config_error(variable: &str, reason: &str) -> AppError {
    AppError::Config(format!("{}: {}", variable, reason))
}
