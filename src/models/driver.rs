//! Modelo de Conductor (chofer)

use serde::{Deserialize, Serialize};

use crate::models::document::DocumentStatus;
use crate::services::filtro::Searchable;
use crate::utils::coalesce::de;

/// Conductor tal como lo devuelve `GET /api/chofer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    #[serde(deserialize_with = "de::string_or_number", alias = "codigo_conductor")]
    pub codigo: String,
    #[serde(alias = "nombre_conductor")]
    pub nombre: String,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub telefono: Option<String>,
    #[serde(default, deserialize_with = "de::document_status")]
    pub estado_documentacion: DocumentStatus,
}

impl Searchable for Driver {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.codigo.as_str(), self.nombre.as_str()];
        if let Some(telefono) = &self.telefono {
            fields.push(telefono.as_str());
        }
        fields
    }

    fn category(&self) -> Option<&str> {
        Some(self.estado_documentacion.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_from_mysql_row() {
        let driver: Driver = serde_json::from_str(
            r#"{"codigo": 1203, "nombre": "Juan Pérez", "telefono": null, "estado_documentacion": "Doc. Vencidos"}"#,
        )
        .unwrap();
        assert_eq!(driver.codigo, "1203");
        assert_eq!(driver.telefono, None);
        assert_eq!(driver.estado_documentacion, DocumentStatus::DocVencidos);
        assert_eq!(driver.category(), Some("Doc. Vencidos"));
    }

    #[test]
    fn test_null_status_does_not_fail_the_row() {
        let drivers: Vec<Driver> = serde_json::from_str(
            r#"[{"codigo": "C01", "nombre": "Ana", "estado_documentacion": null},
                {"codigo": "C02", "nombre": "Luis", "estado_documentacion": 3}]"#,
        )
        .unwrap();
        assert_eq!(drivers[0].estado_documentacion, DocumentStatus::SinDocumentos);
        assert_eq!(drivers[1].estado_documentacion, DocumentStatus::Desconocido);
    }

    #[test]
    fn test_driver_without_status_defaults_to_sin_documentos() {
        let driver: Driver =
            serde_json::from_str(r#"{"codigo": "C01", "nombre": "Ana", "telefono": 987654321}"#).unwrap();
        assert_eq!(driver.estado_documentacion, DocumentStatus::SinDocumentos);
        assert_eq!(driver.search_fields(), vec!["C01", "Ana", "987654321"]);
    }
}
