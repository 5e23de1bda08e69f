//! API en memoria para aislar los servicios en tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::client::BackofficeApi;
use crate::dto::{ClientForm, DriverForm, VehicleForm};
use crate::models::{Boleta, BoletaQuery, Client, DocumentScope, DocumentStatus, Driver, Vehicle};
use crate::utils::errors::{AppError, AppResult};

pub fn driver(codigo: &str, nombre: &str) -> Driver {
    Driver {
        codigo: codigo.to_string(),
        nombre: nombre.to_string(),
        telefono: None,
        estado_documentacion: DocumentStatus::Vigente,
    }
}

pub fn vehicle(placa: &str, marca: &str) -> Vehicle {
    Vehicle {
        placa: placa.to_string(),
        marca: marca.to_string(),
        nombre: String::new(),
        anotacion: None,
        estado_documentacion: DocumentStatus::SinDocumentos,
    }
}

pub fn client(codigo: &str, nombre: &str) -> Client {
    Client {
        codigo: codigo.to_string(),
        nombre: nombre.to_string(),
        email: None,
        email2: None,
    }
}

/// Registra cada llamada como `"<MÉTODO> <recurso> [clave]"`
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    drivers: Mutex<Vec<Driver>>,
    vehicles: Mutex<Vec<Vehicle>>,
    clients: Mutex<Vec<Client>>,
    references: Mutex<HashMap<String, u64>>,
    document_types: Mutex<Vec<Value>>,
    owned_documents: Mutex<Vec<Value>>,
    offline: AtomicBool,
}

impl FakeApi {
    pub fn with_drivers(drivers: Vec<Driver>) -> Self {
        let api = Self::default();
        *api.drivers.lock().unwrap() = drivers;
        api
    }

    pub fn with_vehicles(vehicles: Vec<Vehicle>) -> Self {
        let api = Self::default();
        *api.vehicles.lock().unwrap() = vehicles;
        api
    }

    pub fn with_clients(clients: Vec<Client>) -> Self {
        let api = Self::default();
        *api.clients.lock().unwrap() = clients;
        api
    }

    pub fn set_reference_count(&self, key: &str, count: u64) {
        self.references.lock().unwrap().insert(key.to_string(), count);
    }

    pub fn set_document_types(&self, rows: Vec<Value>) {
        *self.document_types.lock().unwrap() = rows;
    }

    pub fn set_owned_documents(&self, rows: Vec<Value>) {
        *self.owned_documents.lock().unwrap() = rows;
    }

    /// Desde aquí todas las llamadas fallan por conexión
    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.lock().unwrap().clone()
    }

    pub fn clients(&self) -> Vec<Client> {
        self.clients.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> AppResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(AppError::Connection("connection refused".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn references_of(&self, key: &str) -> u64 {
        self.references.lock().unwrap().get(key).copied().unwrap_or(0)
    }
}

fn duplicate(field: &str, key: &str) -> AppError {
    AppError::Duplicate {
        field: field.to_string(),
        message: format!("La {} {} ya existe", field, key),
    }
}

#[async_trait]
impl BackofficeApi for FakeApi {
    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        self.record("GET chofer".to_string())?;
        Ok(self.drivers.lock().unwrap().clone())
    }

    async fn create_driver(&self, form: &DriverForm) -> AppResult<()> {
        self.record(format!("POST chofer {}", form.codigo))?;
        let mut drivers = self.drivers.lock().unwrap();
        if drivers.iter().any(|d| d.codigo == form.codigo) {
            return Err(duplicate("codigo", &form.codigo));
        }
        let mut created = driver(&form.codigo, &form.nombre);
        created.telefono = form.telefono.clone();
        drivers.push(created);
        Ok(())
    }

    async fn update_driver(&self, codigo: &str, form: &DriverForm) -> AppResult<()> {
        self.record(format!("PUT chofer {}", codigo))?;
        let mut drivers = self.drivers.lock().unwrap();
        if let Some(existing) = drivers.iter_mut().find(|d| d.codigo == codigo) {
            existing.nombre = form.nombre.clone();
            existing.telefono = form.telefono.clone();
        }
        Ok(())
    }

    async fn delete_driver(&self, codigo: &str) -> AppResult<()> {
        self.record(format!("DELETE chofer {}", codigo))?;
        self.drivers.lock().unwrap().retain(|d| d.codigo != codigo);
        Ok(())
    }

    async fn count_driver_boletas(&self, codigo: &str) -> AppResult<u64> {
        self.record(format!("GET check-conductor {}", codigo))?;
        Ok(self.references_of(codigo))
    }

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        self.record("GET vehiculos".to_string())?;
        Ok(self.vehicles.lock().unwrap().clone())
    }

    async fn create_vehicle(&self, form: &VehicleForm) -> AppResult<()> {
        self.record(format!("POST vehiculos {}", form.placa))?;
        let mut vehicles = self.vehicles.lock().unwrap();
        if vehicles.iter().any(|v| v.placa == form.placa) {
            return Err(duplicate("placa", &form.placa));
        }
        vehicles.push(vehicle(&form.placa, &form.marca));
        Ok(())
    }

    async fn update_vehicle(&self, placa: &str, form: &VehicleForm) -> AppResult<()> {
        self.record(format!("PUT vehiculos {}", placa))?;
        let mut vehicles = self.vehicles.lock().unwrap();
        if let Some(existing) = vehicles.iter_mut().find(|v| v.placa == placa) {
            existing.marca = form.marca.clone();
            existing.nombre = form.nombre.clone();
            existing.anotacion = form.anotacion.clone();
        }
        Ok(())
    }

    async fn delete_vehicle(&self, placa: &str) -> AppResult<()> {
        self.record(format!("DELETE vehiculos {}", placa))?;
        self.vehicles.lock().unwrap().retain(|v| v.placa != placa);
        Ok(())
    }

    async fn count_vehicle_boletas(&self, placa: &str) -> AppResult<u64> {
        self.record(format!("GET check-vehiculo {}", placa))?;
        Ok(self.references_of(placa))
    }

    async fn list_clients(&self) -> AppResult<Vec<Client>> {
        self.record("GET clientes".to_string())?;
        Ok(self.clients.lock().unwrap().clone())
    }

    async fn create_client(&self, form: &ClientForm) -> AppResult<()> {
        self.record(format!("POST clientes {}", form.codigo))?;
        self.clients.lock().unwrap().push(Client {
            codigo: form.codigo.clone(),
            nombre: form.nombre.clone(),
            email: form.email.clone(),
            email2: form.email2.clone(),
        });
        Ok(())
    }

    async fn update_client(&self, codigo: &str, form: &ClientForm) -> AppResult<()> {
        self.record(format!("PUT clientes {}", codigo))?;
        if let Some(found) = self.clients.lock().unwrap().iter_mut().find(|c| c.codigo == codigo) {
            found.nombre = form.nombre.clone();
            found.email = form.email.clone();
            found.email2 = form.email2.clone();
        }
        Ok(())
    }

    async fn delete_client(&self, codigo: &str) -> AppResult<()> {
        self.record(format!("DELETE clientes {}", codigo))?;
        self.clients.lock().unwrap().retain(|c| c.codigo != codigo);
        Ok(())
    }

    async fn count_client_boletas(&self, codigo: &str) -> AppResult<u64> {
        self.record(format!("GET check-cliente {}", codigo))?;
        Ok(self.references_of(codigo))
    }

    async fn list_document_types(&self, scope: DocumentScope) -> AppResult<Vec<Value>> {
        self.record(format!("GET documentos/tipos {}", scope.as_str()))?;
        Ok(self.document_types.lock().unwrap().clone())
    }

    async fn list_owned_documents(&self, scope: DocumentScope, key: &str) -> AppResult<Vec<Value>> {
        self.record(format!("GET {} {}", scope.owned_resource(), key))?;
        Ok(self.owned_documents.lock().unwrap().clone())
    }

    async fn list_boletas(&self, query: &BoletaQuery) -> AppResult<Vec<Boleta>> {
        self.record(format!("GET boletas {} {}", query.desde, query.hasta))?;
        Ok(Vec::new())
    }
}
