//! Configuración de variables de entorno
//!
//! Este módulo lee la configuración del cliente del back-office. Todas las
//! variables tienen un valor por defecto salvo `HTTP_TIMEOUT_SECS`, que es
//! opcional.

use std::env;
use std::time::Duration;
use tracing::Level;

use crate::utils::errors::{config_error, AppResult};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub api_base_url: String,
    pub http_timeout: Option<Duration>,
    pub list_page_size: usize,
    pub log_level: Level,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            http_timeout: None,
            list_page_size: DEFAULT_PAGE_SIZE,
            log_level: Level::INFO,
        }
    }
}

impl EnvironmentConfig {
    /// Carga `.env` si existe y lee las variables del proceso
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let read = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout = match read("HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| config_error("HTTP_TIMEOUT_SECS", "debe ser un número de segundos"))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let list_page_size = match read("LIST_PAGE_SIZE") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(config_error("LIST_PAGE_SIZE", "debe ser un entero positivo")),
            },
            None => defaults.list_page_size,
        };

        let log_level = match read("LOG_LEVEL") {
            Some(raw) => raw
                .parse::<Level>()
                .map_err(|_| config_error("LOG_LEVEL", "nivel desconocido"))?,
            None => defaults.log_level,
        };

        Ok(Self {
            environment: read("ENVIRONMENT").unwrap_or(defaults.environment),
            api_base_url: read("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            http_timeout,
            list_page_size,
            log_level,
        })
    }
}
