//! Cliente HTTP para la API REST del back-office
//!
//! Este módulo contiene el trait `BackofficeApi`, que es la frontera usada por
//! todos los servicios, y su implementación sobre `reqwest`.
//!
//! Toda respuesta se espera como `{success: boolean, ...payload}`; un status
//! fuera de 2xx o `success: false` se trata como error.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::dto::{ClientForm, DriverForm, VehicleForm};
use crate::models::auth::{LoginRequest, LoginUser};
use crate::models::{Boleta, BoletaQuery, Client as Cliente, DocumentScope, Driver, Session, Vehicle};
use crate::utils::coalesce::{extract_rows, first_i64, first_present};
use crate::utils::errors::{classify_rejection, AppError, AppResult, FALLBACK_ERROR_MESSAGE};

/// Cabecera con la que el servidor identifica al usuario
pub const USER_ID_HEADER: &str = "x-usuario-id";

/// Operaciones de la API que consumen los servicios
#[async_trait]
pub trait BackofficeApi: Send + Sync {
    async fn list_drivers(&self) -> AppResult<Vec<Driver>>;
    async fn create_driver(&self, form: &DriverForm) -> AppResult<()>;
    async fn update_driver(&self, codigo: &str, form: &DriverForm) -> AppResult<()>;
    async fn delete_driver(&self, codigo: &str) -> AppResult<()>;
    /// Número de boletas que referencian al conductor
    async fn count_driver_boletas(&self, codigo: &str) -> AppResult<u64>;

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>>;
    async fn create_vehicle(&self, form: &VehicleForm) -> AppResult<()>;
    async fn update_vehicle(&self, placa: &str, form: &VehicleForm) -> AppResult<()>;
    async fn delete_vehicle(&self, placa: &str) -> AppResult<()>;
    async fn count_vehicle_boletas(&self, placa: &str) -> AppResult<u64>;

    async fn list_clients(&self) -> AppResult<Vec<Cliente>>;
    async fn create_client(&self, form: &ClientForm) -> AppResult<()>;
    async fn update_client(&self, codigo: &str, form: &ClientForm) -> AppResult<()>;
    async fn delete_client(&self, codigo: &str) -> AppResult<()>;
    async fn count_client_boletas(&self, codigo: &str) -> AppResult<u64>;

    /// Tipos de documento configurados para conductores o vehículos (filas crudas)
    async fn list_document_types(&self, scope: DocumentScope) -> AppResult<Vec<Value>>;
    /// Documentos registrados para una entidad (filas crudas)
    async fn list_owned_documents(&self, scope: DocumentScope, key: &str) -> AppResult<Vec<Value>>;

    async fn list_boletas(&self, query: &BoletaQuery) -> AppResult<Vec<Boleta>>;
}

/// Cliente HTTP de la API del back-office
pub struct HttpBackofficeClient {
    client: Client,
    base_url: String,
    usuario_id: Option<String>,
}

impl HttpBackofficeClient {
    /// Crear nuevo cliente; sin timeout salvo que se configure uno
    pub fn new(base_url: &str, timeout: Option<Duration>) -> AppResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("No se pudo crear el cliente HTTP: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            usuario_id: None,
        })
    }

    pub fn usuario_id(&self) -> Option<&str> {
        self.usuario_id.as_deref()
    }

    /// Iniciar sesión: obtiene el usuario con sus permisos y fija `x-usuario-id`
    pub async fn login(&mut self, usuario: &str, clave: &str) -> AppResult<Session> {
        let request = LoginRequest {
            usuario: usuario.to_string(),
            clave: clave.to_string(),
        };
        let body = self
            .send(self.request(Method::POST, "/auth/login").json(&request), None)
            .await?;

        let user = first_present(&body, &["usuario", "user", "data"])
            .cloned()
            .ok_or_else(|| AppError::Decode("La respuesta de login no trae usuario".to_string()))?;
        let user: LoginUser = serde_json::from_value(user)?;
        let session = Session::from(user);

        info!("🔐 Sesión iniciada para {} (rol {})", session.nombre, session.rol.as_str());
        self.usuario_id = Some(session.usuario_id.clone());
        Ok(session)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!("➡️ {} {}", method, path);
        let builder = self
            .client
            .request(method, self.url(path))
            .header("Accept", "application/json");
        match &self.usuario_id {
            Some(id) => builder.header(USER_ID_HEADER, id),
            None => builder,
        }
    }

    /// Envía la petición y devuelve el cuerpo JSON si fue exitosa.
    ///
    /// `key_field` es la clave natural del recurso; permite reconocer los
    /// conflictos de duplicado en altas.
    async fn send(&self, request: RequestBuilder, key_field: Option<&str>) -> AppResult<Value> {
        let response = request.send().await.map_err(|e| {
            warn!("❌ Error de red: {}", e);
            AppError::Connection(e.to_string())
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| AppError::Connection(e.to_string()))?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            match serde_json::from_str(&text) {
                Ok(body) => body,
                Err(e) if status.is_success() => return Err(AppError::Decode(e.to_string())),
                Err(_) => Value::Null,
            }
        };

        let flagged_failure = body.get("success").and_then(Value::as_bool) == Some(false);
        if !status.is_success() || flagged_failure {
            let message = error_message(&body);
            warn!("❌ Respuesta de error {}: {}", status, message);
            // success:false con 200 se reporta como solicitud rechazada
            let status = if status.is_success() { StatusCode::BAD_REQUEST } else { status };
            return Err(classify_rejection(status, message, key_field));
        }

        Ok(body)
    }

    async fn get_rows<T: DeserializeOwned>(&self, path: &str, list_key: &str) -> AppResult<Vec<T>> {
        let body = self.send(self.request(Method::GET, path), None).await?;
        extract_rows(&body, &["data", "rows", list_key])
            .into_iter()
            .map(|row| serde_json::from_value(row).map_err(AppError::from))
            .collect()
    }

    async fn get_raw_rows(&self, path: &str, list_key: &str) -> AppResult<Vec<Value>> {
        let body = self.send(self.request(Method::GET, path), None).await?;
        Ok(extract_rows(&body, &["data", "rows", list_key]))
    }

    async fn write<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        key_field: &str,
    ) -> AppResult<()> {
        self.send(self.request(method, path).json(body), Some(key_field))
            .await
            .map(|_| ())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        self.send(self.request(Method::DELETE, path), None).await.map(|_| ())
    }

    async fn reference_count(&self, path: &str) -> AppResult<u64> {
        let body = self.send(self.request(Method::GET, path), None).await?;
        parse_reference_count(&body)
    }
}

/// Mensaje de error del cuerpo: `error` ?? `message` ?? texto de respaldo
fn error_message(body: &Value) -> String {
    first_present(body, &["error", "message"])
        .and_then(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(_) => value.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Conteo de referencias: `count` ?? `cantidad` ?? `total`; un indicador
/// booleano sin conteo vale 1. Se busca en el cuerpo y luego en `data`.
///
/// Sin ninguno de esos campos es un error: no se puede confirmar que la
/// entidad esté libre de boletas.
fn parse_reference_count(body: &Value) -> AppResult<u64> {
    let scopes = [Some(body), body.get("data")];
    for scope in scopes.into_iter().flatten() {
        if let Some(count) = first_i64(scope, &["count", "cantidad", "total"]) {
            return Ok(count.max(0) as u64);
        }
        if let Some(flagged) = first_present(scope, &["existe", "tieneBoletas", "exists"]).and_then(Value::as_bool) {
            return Ok(u64::from(flagged));
        }
    }
    Err(AppError::Decode(format!(
        "La verificación de boletas no trae conteo: {}",
        body
    )))
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

#[async_trait]
impl BackofficeApi for HttpBackofficeClient {
    async fn list_drivers(&self) -> AppResult<Vec<Driver>> {
        self.get_rows("/chofer", "choferes").await
    }

    async fn create_driver(&self, form: &DriverForm) -> AppResult<()> {
        self.write(Method::POST, "/chofer", form, "codigo").await
    }

    async fn update_driver(&self, codigo: &str, form: &DriverForm) -> AppResult<()> {
        let path = format!("/chofer/{}", segment(codigo));
        self.write(Method::PUT, &path, form, "codigo").await
    }

    async fn delete_driver(&self, codigo: &str) -> AppResult<()> {
        self.delete(&format!("/chofer/{}", segment(codigo))).await
    }

    async fn count_driver_boletas(&self, codigo: &str) -> AppResult<u64> {
        self.reference_count(&format!("/boletas/check-conductor/{}", segment(codigo)))
            .await
    }

    async fn list_vehicles(&self) -> AppResult<Vec<Vehicle>> {
        self.get_rows("/vehiculos/document-status", "vehiculos").await
    }

    async fn create_vehicle(&self, form: &VehicleForm) -> AppResult<()> {
        self.write(Method::POST, "/vehiculos", form, "placa").await
    }

    async fn update_vehicle(&self, placa: &str, form: &VehicleForm) -> AppResult<()> {
        let path = format!("/vehiculos/{}", segment(placa));
        self.write(Method::PUT, &path, form, "placa").await
    }

    async fn delete_vehicle(&self, placa: &str) -> AppResult<()> {
        self.delete(&format!("/vehiculos/{}", segment(placa))).await
    }

    async fn count_vehicle_boletas(&self, placa: &str) -> AppResult<u64> {
        self.reference_count(&format!("/boletas/check-vehiculo/{}", segment(placa)))
            .await
    }

    async fn list_clients(&self) -> AppResult<Vec<Cliente>> {
        self.get_rows("/clientes", "clientes").await
    }

    async fn create_client(&self, form: &ClientForm) -> AppResult<()> {
        self.write(Method::POST, "/clientes", form, "codigo").await
    }

    async fn update_client(&self, codigo: &str, form: &ClientForm) -> AppResult<()> {
        let path = format!("/clientes/{}", segment(codigo));
        self.write(Method::PUT, &path, form, "codigo").await
    }

    async fn delete_client(&self, codigo: &str) -> AppResult<()> {
        self.delete(&format!("/clientes/{}", segment(codigo))).await
    }

    async fn count_client_boletas(&self, codigo: &str) -> AppResult<u64> {
        self.reference_count(&format!("/boletas/check-cliente/{}", segment(codigo)))
            .await
    }

    async fn list_document_types(&self, scope: DocumentScope) -> AppResult<Vec<Value>> {
        let path = format!("/documentos/tipos?aplica={}", scope.as_str());
        self.get_raw_rows(&path, "documentos").await
    }

    async fn list_owned_documents(&self, scope: DocumentScope, key: &str) -> AppResult<Vec<Value>> {
        let path = format!("/{}/{}?includeAll=1", scope.owned_resource(), segment(key));
        self.get_raw_rows(&path, "documentos").await
    }

    async fn list_boletas(&self, query: &BoletaQuery) -> AppResult<Vec<Boleta>> {
        let path = format!(
            "/boletas?desde={}&hasta={}",
            query.desde.format("%Y-%m-%d"),
            query.hasta.format("%Y-%m-%d")
        );
        self.get_rows(&path, "boletas").await
    }
}
