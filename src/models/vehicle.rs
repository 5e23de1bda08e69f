//! Modelo de Vehículo
//!
//! La placa es la clave natural; el estado de documentación llega ya
//! calculado desde `GET /api/vehiculos/document-status`.

use serde::{Deserialize, Serialize};

use crate::models::document::DocumentStatus;
use crate::services::filtro::Searchable;
use crate::utils::coalesce::de;

/// Vehículo con su estado de documentación
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub placa: String,
    #[serde(default)]
    pub marca: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub anotacion: Option<String>,
    #[serde(default, deserialize_with = "de::document_status")]
    pub estado_documentacion: DocumentStatus,
}

impl Vehicle {
    /// Extractor de categoría para filtrar por marca en lugar de estado
    pub fn brand(vehicle: &Vehicle) -> Option<&str> {
        Some(vehicle.marca.as_str())
    }
}

impl Searchable for Vehicle {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.placa.as_str(), self.marca.as_str(), self.nombre.as_str()];
        if let Some(anotacion) = &self.anotacion {
            fields.push(anotacion.as_str());
        }
        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.estado_documentacion.as_str())
    }
}
