//! Configuración del proyecto
//!
//! Variables de entorno del cliente y conexión a la base de datos para los
//! reportes de inspección.

pub mod database;
pub mod environment;

pub use database::DatabaseConfig;
pub use environment::EnvironmentConfig;
