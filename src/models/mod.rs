//! Modelos del sistema
//!
//! DTOs delgados que reflejan las filas de MySQL y las respuestas de la API.

pub mod auth;
pub mod boleta;
pub mod client;
pub mod document;
pub mod driver;
pub mod vehicle;

pub use auth::{Permission, Session, UserRole};
pub use boleta::{Boleta, BoletaQuery, Manifiesto};
pub use client::Client;
pub use document::{DocumentRecord, DocumentScope, DocumentStatus};
pub use driver::Driver;
pub use vehicle::Vehicle;
