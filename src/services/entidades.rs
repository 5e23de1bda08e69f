//! Entidades administrables por el flujo CRUD
//!
//! Cada entidad declara su terna de permisos, su clave natural y qué
//! llamadas de `BackofficeApi` le corresponden.

use futures::future::BoxFuture;

use crate::client::BackofficeApi;
use crate::dto::{ClientForm, DriverForm, EntityForm, VehicleForm};
use crate::models::{Client, Driver, Vehicle};
use crate::services::filtro::Searchable;
use crate::utils::errors::AppResult;

pub trait CrudEntity: Searchable + Clone + Send + Sync + 'static {
    type Form: EntityForm;

    /// Módulo y submódulo en la tabla de permisos
    const MODULE: &'static str;
    const SUBMODULE: &'static str;
    /// Nombre de la entidad en avisos y mensajes ("Conductor")
    const LABEL: &'static str;

    fn key(&self) -> &str;

    /// Formulario pre-llenado para edición
    fn to_form(&self) -> Self::Form;

    fn fetch_all(api: &dyn BackofficeApi) -> BoxFuture<'_, AppResult<Vec<Self>>>;

    fn create<'a>(api: &'a dyn BackofficeApi, form: &'a Self::Form) -> BoxFuture<'a, AppResult<()>>;

    fn update<'a>(
        api: &'a dyn BackofficeApi,
        key: &'a str,
        form: &'a Self::Form,
    ) -> BoxFuture<'a, AppResult<()>>;

    fn remove<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<()>>;

    /// Boletas que referencian a la entidad; mayor que cero bloquea el borrado
    fn count_references<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<u64>>;
}

impl CrudEntity for Driver {
    type Form = DriverForm;

    const MODULE: &'static str = "Transportes";
    const SUBMODULE: &'static str = "Lista de Conductores";
    const LABEL: &'static str = "Conductor";

    fn key(&self) -> &str {
        &self.codigo
    }

    fn to_form(&self) -> DriverForm {
        DriverForm {
            codigo: self.codigo.clone(),
            nombre: self.nombre.clone(),
            telefono: self.telefono.clone(),
        }
    }

    fn fetch_all(api: &dyn BackofficeApi) -> BoxFuture<'_, AppResult<Vec<Self>>> {
        api.list_drivers()
    }

    fn create<'a>(api: &'a dyn BackofficeApi, form: &'a DriverForm) -> BoxFuture<'a, AppResult<()>> {
        api.create_driver(form)
    }

    fn update<'a>(
        api: &'a dyn BackofficeApi,
        key: &'a str,
        form: &'a DriverForm,
    ) -> BoxFuture<'a, AppResult<()>> {
        api.update_driver(key, form)
    }

    fn remove<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<()>> {
        api.delete_driver(key)
    }

    fn count_references<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<u64>> {
        api.count_driver_boletas(key)
    }
}

impl CrudEntity for Vehicle {
    type Form = VehicleForm;

    const MODULE: &'static str = "Transportes";
    const SUBMODULE: &'static str = "Lista de Vehículos";
    const LABEL: &'static str = "Vehículo";

    fn key(&self) -> &str {
        &self.placa
    }

    fn to_form(&self) -> VehicleForm {
        VehicleForm {
            placa: self.placa.clone(),
            marca: self.marca.clone(),
            nombre: self.nombre.clone(),
            anotacion: self.anotacion.clone(),
        }
    }

    fn fetch_all(api: &dyn BackofficeApi) -> BoxFuture<'_, AppResult<Vec<Self>>> {
        api.list_vehicles()
    }

    fn create<'a>(api: &'a dyn BackofficeApi, form: &'a VehicleForm) -> BoxFuture<'a, AppResult<()>> {
        api.create_vehicle(form)
    }

    fn update<'a>(
        api: &'a dyn BackofficeApi,
        key: &'a str,
        form: &'a VehicleForm,
    ) -> BoxFuture<'a, AppResult<()>> {
        api.update_vehicle(key, form)
    }

    fn remove<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<()>> {
        api.delete_vehicle(key)
    }

    fn count_references<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<u64>> {
        api.count_vehicle_boletas(key)
    }
}

impl CrudEntity for Client {
    type Form = ClientForm;

    const MODULE: &'static str = "Comercial";
    const SUBMODULE: &'static str = "Lista de Clientes";
    const LABEL: &'static str = "Cliente";

    fn key(&self) -> &str {
        &self.codigo
    }

    fn to_form(&self) -> ClientForm {
        ClientForm {
            codigo: self.codigo.clone(),
            nombre: self.nombre.clone(),
            email: self.email.clone(),
            email2: self.email2.clone(),
        }
    }

    fn fetch_all(api: &dyn BackofficeApi) -> BoxFuture<'_, AppResult<Vec<Self>>> {
        api.list_clients()
    }

    fn create<'a>(api: &'a dyn BackofficeApi, form: &'a ClientForm) -> BoxFuture<'a, AppResult<()>> {
        api.create_client(form)
    }

    fn update<'a>(
        api: &'a dyn BackofficeApi,
        key: &'a str,
        form: &'a ClientForm,
    ) -> BoxFuture<'a, AppResult<()>> {
        api.update_client(key, form)
    }

    fn remove<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<()>> {
        api.delete_client(key)
    }

    fn count_references<'a>(api: &'a dyn BackofficeApi, key: &'a str) -> BoxFuture<'a, AppResult<u64>> {
        api.count_client_boletas(key)
    }
}
