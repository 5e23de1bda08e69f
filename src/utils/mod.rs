//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! de formularios y coalescencia de campos JSON heterogéneos.

pub mod coalesce;
pub mod errors;
pub mod validation;

pub use errors::{AppError, AppResult};
