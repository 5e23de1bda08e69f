//! Servicios del back-office
//!
//! Lógica independiente de la vista: detalle de documentos, filtro de listas,
//! flujo CRUD de los modales y verificación de permisos.

pub mod boletas;
pub mod documentos;
pub mod entidades;
pub mod filtro;
pub mod flujo_crud;
pub mod permisos;

#[cfg(test)]
pub(crate) mod test_support;

pub use entidades::CrudEntity;
pub use filtro::{CategoryFilter, FilteredList, NavKey, Searchable};
pub use flujo_crud::{CrudWorkflow, WorkflowState};
pub use permisos::{CrudAction, PermissionGate};
