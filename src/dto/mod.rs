//! DTOs de entrada
//!
//! Formularios enviados a la API REST.

pub mod forms;

pub use forms::{ClientForm, DriverForm, EntityForm, VehicleForm};
