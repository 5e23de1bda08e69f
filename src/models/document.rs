//! Modelo de documentación
//!
//! Estado de documentación derivado (calculado por la API a partir de las
//! fechas de vencimiento) y filas normalizadas del detalle de documentos.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Estado del registro cuando la entidad no tiene el documento cargado
pub const SIN_REGISTRO: &str = "Sin Registro";

/// Estado de documentación de un conductor o vehículo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DocumentStatus {
    #[serde(rename = "Vigente")]
    Vigente,
    #[serde(rename = "Vigente por vencer")]
    VigentePorVencer,
    #[serde(rename = "Doc. Vencidos")]
    DocVencidos,
    #[serde(rename = "Sin Documentos")]
    #[default]
    SinDocumentos,
    #[serde(other)]
    Desconocido,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Vigente => "Vigente",
            DocumentStatus::VigentePorVencer => "Vigente por vencer",
            DocumentStatus::DocVencidos => "Doc. Vencidos",
            DocumentStatus::SinDocumentos => "Sin Documentos",
            DocumentStatus::Desconocido => "Desconocido",
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entidad dueña de los documentos del detalle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentScope {
    Conductor,
    Vehiculo,
}

impl DocumentScope {
    /// Valor del parámetro `aplica` para los tipos configurados
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentScope::Conductor => "conductor",
            DocumentScope::Vehiculo => "vehiculo",
        }
    }

    /// Recurso REST con los documentos propios de la entidad
    pub fn owned_resource(&self) -> &'static str {
        match self {
            DocumentScope::Conductor => "conductor-documento",
            DocumentScope::Vehiculo => "vehiculo-documento",
        }
    }
}

/// Fila normalizada del detalle de documentos
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRecord {
    pub documento_id: Option<i64>,
    pub nombre: String,
    pub fecha_emision: Option<NaiveDate>,
    pub fecha_vencimiento: Option<NaiveDate>,
    pub estado: String,
    pub archivo: Option<String>,
}

impl DocumentRecord {
    pub fn is_registered(&self) -> bool {
        self.estado != SIN_REGISTRO
    }
}
