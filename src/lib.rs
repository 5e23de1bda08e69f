//! Back-office de gestión de residuos
//!
//! Cliente de la API REST del ERP (conductores, vehículos, clientes,
//! documentos y boletas) junto con la lógica de las vistas de administración:
//! filtro de listas, flujo CRUD de los modales, permisos y el detalle de
//! documentos.

pub mod client;
pub mod config;
pub mod dto;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;

pub use client::{BackofficeApi, HttpBackofficeClient};
pub use utils::errors::{AppError, AppResult};
