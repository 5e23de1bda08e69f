//! Formularios de alta y edición
//!
//! Cuerpos de `POST`/`PUT` para conductores, vehículos y clientes. Se validan
//! con `validator` antes de cualquier llamada de red.

use serde::Serialize;
use validator::Validate;

use crate::utils::validation::{normalize_placa, validate_not_blank, validate_phone, validate_placa};

/// Comportamiento común de los formularios del flujo CRUD
pub trait EntityForm: Validate + Serialize + Clone + Default + Send + Sync {
    /// Campos en el orden en que se muestran; decide cuál recibe el foco
    const FIELDS: &'static [&'static str];

    /// Clave natural contenida en el formulario
    fn key(&self) -> &str;

    /// Fija la clave natural (en edición es de solo lectura)
    fn set_key(&mut self, key: &str);

    /// Recorta espacios y convierte opcionales vacíos en `None`
    fn normalized(self) -> Self;
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct DriverForm {
    #[validate(custom = "validate_not_blank", length(max = 20))]
    pub codigo: String,
    #[validate(custom = "validate_not_blank", length(max = 100))]
    pub nombre: String,
    #[validate(custom = "validate_phone")]
    pub telefono: Option<String>,
}

impl EntityForm for DriverForm {
    const FIELDS: &'static [&'static str] = &["codigo", "nombre", "telefono"];

    fn key(&self) -> &str {
        &self.codigo
    }

    fn set_key(&mut self, key: &str) {
        self.codigo = key.to_string();
    }

    fn normalized(self) -> Self {
        Self {
            codigo: self.codigo.trim().to_string(),
            nombre: self.nombre.trim().to_string(),
            telefono: blank_to_none(self.telefono),
        }
    }
}

/// Cuerpo de `POST /api/vehiculos`: `{placa, marca, nombre, anotacion}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct VehicleForm {
    #[validate(custom = "validate_placa")]
    pub placa: String,
    #[validate(custom = "validate_not_blank", length(max = 50))]
    pub marca: String,
    #[validate(length(max = 100))]
    pub nombre: String,
    #[validate(length(max = 255))]
    pub anotacion: Option<String>,
}

impl EntityForm for VehicleForm {
    const FIELDS: &'static [&'static str] = &["placa", "marca", "nombre", "anotacion"];

    fn key(&self) -> &str {
        &self.placa
    }

    fn set_key(&mut self, key: &str) {
        self.placa = key.to_string();
    }

    fn normalized(self) -> Self {
        Self {
            placa: normalize_placa(&self.placa),
            marca: self.marca.trim().to_string(),
            nombre: self.nombre.trim().to_string(),
            anotacion: blank_to_none(self.anotacion),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
pub struct ClientForm {
    #[validate(custom = "validate_not_blank", length(max = 20))]
    pub codigo: String,
    #[validate(custom = "validate_not_blank", length(max = 150))]
    pub nombre: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(email)]
    pub email2: Option<String>,
}

impl EntityForm for ClientForm {
    const FIELDS: &'static [&'static str] = &["codigo", "nombre", "email", "email2"];

    fn key(&self) -> &str {
        &self.codigo
    }

    fn set_key(&mut self, key: &str) {
        self.codigo = key.to_string();
    }

    fn normalized(self) -> Self {
        Self {
            codigo: self.codigo.trim().to_string(),
            nombre: self.nombre.trim().to_string(),
            email: blank_to_none(self.email),
            email2: blank_to_none(self.email2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_form_normalizes_and_validates() {
        let form = VehicleForm {
            placa: " abc123 ".to_string(),
            marca: "Volvo".to_string(),
            nombre: "Tolva".to_string(),
            anotacion: Some("  ".to_string()),
        }
        .normalized();
        assert_eq!(form.placa, "ABC123");
        assert_eq!(form.anotacion, None);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_vehicle_form_rejects_bad_placa() {
        let form = VehicleForm {
            placa: "A".to_string(),
            marca: "Volvo".to_string(),
            ..Default::default()
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("placa"));
    }

    #[test]
    fn test_driver_form_requires_nombre() {
        let form = DriverForm {
            codigo: "C01".to_string(),
            nombre: "   ".to_string(),
            telefono: None,
        };
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nombre"));
        assert!(!errors.field_errors().contains_key("codigo"));
    }

    #[test]
    fn test_client_form_blank_email_is_accepted() {
        let form = ClientForm {
            codigo: "CL-9".to_string(),
            nombre: "Municipalidad".to_string(),
            email: Some(String::new()),
            email2: Some("no-es-correo".to_string()),
        }
        .normalized();
        assert_eq!(form.email, None);
        let errors = form.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email2"));
    }

    #[test]
    fn test_vehicle_form_serializes_wire_fields() {
        let form = VehicleForm {
            placa: "ABC123".to_string(),
            marca: "Volvo".to_string(),
            nombre: "Tolva".to_string(),
            anotacion: None,
        };
        let body = serde_json::to_value(&form).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"placa": "ABC123", "marca": "Volvo", "nombre": "Tolva", "anotacion": null})
        );
    }
}
