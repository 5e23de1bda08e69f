//! Configuración de base de datos
//!
//! Conexión de solo lectura a la base MySQL del ERP, usada por el script de
//! inspección de boletas.

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use std::env;
use std::time::Duration;

use crate::utils::errors::{config_error, AppResult};

/// Configuración de la base de datos
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl DatabaseConfig {
    /// Lee `DATABASE_URL` o, si no está, arma la URL con `DB_HOST`, `DB_PORT`,
    /// `DB_USER`, `DB_PASSWORD` y `DB_NAME`
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let url = match read("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = read("DB_HOST").ok_or_else(|| config_error("DB_HOST", "no está definida"))?;
                let port: u16 = match read("DB_PORT") {
                    Some(raw) => raw
                        .parse()
                        .map_err(|_| config_error("DB_PORT", "debe ser un puerto válido"))?,
                    None => 3306,
                };
                let user = read("DB_USER").ok_or_else(|| config_error("DB_USER", "no está definida"))?;
                let password = read("DB_PASSWORD").unwrap_or_default();
                let name = read("DB_NAME").ok_or_else(|| config_error("DB_NAME", "no está definida"))?;
                format!(
                    "mysql://{}:{}@{}:{}/{}",
                    urlencoding::encode(&user),
                    urlencoding::encode(&password),
                    host,
                    port,
                    name
                )
            }
        };

        Ok(Self {
            url,
            max_connections: 5,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(60),
        })
    }

    /// Crear un nuevo pool de conexiones
    pub async fn create_pool(&self) -> AppResult<MySqlPool> {
        let pool = MySqlPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .connect(&self.url)
            .await?;
        Ok(pool)
    }
}
