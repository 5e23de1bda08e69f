//! Utilidades de validación
//!
//! Validadores personalizados usados por los formularios de conductores,
//! vehículos y clientes antes de cualquier llamada de red.

use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

lazy_static! {
    /// Placa: letras, dígitos y guiones, sin distinguir mayúsculas
    pub static ref PLACA_REGEX: Regex = Regex::new(r"(?i)^[A-Z0-9-]{3,10}$").unwrap();
}

/// Validar que un string no esté vacío
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_blank");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (7 a 15 dígitos, se ignoran separadores)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Ok(());
    }
    if value.chars().any(|c| c.is_alphabetic()) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        error.add_param("digits".into(), &digits);
        return Err(error);
    }
    Ok(())
}

/// Validar formato de placa
pub fn validate_placa(value: &str) -> Result<(), ValidationError> {
    if !PLACA_REGEX.is_match(value.trim()) {
        let mut error = ValidationError::new("placa");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"3-10 letras, dígitos o guiones".to_string());
        return Err(error);
    }
    Ok(())
}

/// Normaliza una placa para enviarla al servidor
pub fn normalize_placa(value: &str) -> String {
    value.trim().to_uppercase()
}
