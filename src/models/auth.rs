//! Modelos de autenticación
//!
//! Sesión del usuario y su conjunto de permisos, poblados al iniciar sesión.

use serde::{Deserialize, Serialize};

use crate::utils::coalesce::de;

/// Roles del sistema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    Admin,
    Usuario,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Usuario => "usuario",
        }
    }

    /// Cualquier rol distinto de administrador es un usuario común
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "admin" | "administrador" => UserRole::Admin,
            _ => UserRole::Usuario,
        }
    }
}

/// Permiso (módulo, submódulo, acción) con su bandera de habilitado
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub modulo: String,
    pub submodulo: String,
    pub accion: String,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub habilitado: bool,
}

impl Permission {
    pub fn new(modulo: &str, submodulo: &str, accion: &str, habilitado: bool) -> Self {
        Self {
            modulo: modulo.to_string(),
            submodulo: submodulo.to_string(),
            accion: accion.to_string(),
            habilitado,
        }
    }
}

/// Usuario tal como llega en la respuesta de login
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginUser {
    #[serde(deserialize_with = "de::string_or_number")]
    pub id: String,
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub rol: String,
    #[serde(default)]
    pub permisos: Vec<Permission>,
}

/// Request de login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub usuario: String,
    pub clave: String,
}

/// Sesión autenticada, en memoria durante toda la ejecución
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub usuario_id: String,
    pub nombre: String,
    pub rol: UserRole,
    pub permisos: Vec<Permission>,
}

impl From<LoginUser> for Session {
    fn from(user: LoginUser) -> Self {
        Self {
            usuario_id: user.id,
            nombre: user.nombre,
            rol: UserRole::from_label(&user.rol),
            permisos: user.permisos,
        }
    }
}
