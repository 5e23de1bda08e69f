//! Detalle de documentos de conductores y vehículos
//!
//! Se piden en paralelo los tipos de documento configurados y los documentos
//! registrados para la entidad. Si la entidad tiene al menos un documento se
//! usan esos tal cual; si no (o si esa llamada falla) se muestran los tipos
//! configurados marcados como "Sin Registro". Si falla la lista configurada,
//! falla toda la operación.

use serde_json::Value;
use tracing::{debug, warn};

use crate::client::BackofficeApi;
use crate::models::document::{DocumentRecord, DocumentScope, SIN_REGISTRO};
use crate::utils::coalesce::{first_date, first_i64, first_string};
use crate::utils::errors::{AppError, AppResult};

pub const DOCUMENTS_ERROR_MESSAGE: &str = "No se pudieron cargar los documentos";

const ID_KEYS: &[&str] = &["documento_id", "docu_id", "id"];
const NAME_KEYS: &[&str] = &["nombre", "docu_nombre", "nombre_documento"];
const ISSUED_KEYS: &[&str] = &["fecha_emision", "emision"];
const EXPIRY_KEYS: &[&str] = &["fecha_vencimiento", "vencimiento", "fecha_venc"];
const STATUS_KEYS: &[&str] = &["estado", "estado_documento"];
const FILE_KEYS: &[&str] = &["archivo", "ruta_archivo"];

/// Carga el detalle de documentos de una entidad
pub async fn load_documents(
    api: &dyn BackofficeApi,
    scope: DocumentScope,
    key: &str,
) -> AppResult<Vec<DocumentRecord>> {
    let (configured, owned) = futures::join!(
        api.list_document_types(scope),
        api.list_owned_documents(scope, key)
    );
    debug!(
        "📄 Documentos de {} {}: configurados ok={}, propios ok={}",
        scope.as_str(),
        key,
        configured.is_ok(),
        owned.is_ok()
    );
    merge_documents(configured, owned)
}

/// Resuelve la lista final a partir de ambas respuestas
pub fn merge_documents(
    configured: AppResult<Vec<Value>>,
    owned: AppResult<Vec<Value>>,
) -> AppResult<Vec<DocumentRecord>> {
    let configured = configured.map_err(|e| {
        warn!("❌ Error cargando tipos de documento: {}", e);
        AppError::Http {
            status: 500,
            message: DOCUMENTS_ERROR_MESSAGE.to_string(),
        }
    })?;

    let owned = owned.unwrap_or_else(|e| {
        warn!("⚠️ Documentos propios no disponibles, se usa la lista configurada: {}", e);
        Vec::new()
    });

    if !owned.is_empty() {
        return Ok(owned.iter().map(|row| normalize_row(row, None)).collect());
    }

    Ok(configured
        .iter()
        .map(|row| normalize_row(row, Some(SIN_REGISTRO)))
        .collect())
}

/// Normaliza una fila de cualquiera de los dos endpoints.
///
/// `forced_status` reemplaza el estado de la fila.
pub fn normalize_row(row: &Value, forced_status: Option<&str>) -> DocumentRecord {
    let estado = match forced_status {
        Some(status) => status.to_string(),
        None => first_string(row, STATUS_KEYS).unwrap_or_else(|| SIN_REGISTRO.to_string()),
    };

    DocumentRecord {
        documento_id: first_i64(row, ID_KEYS),
        nombre: first_string(row, NAME_KEYS).unwrap_or_default(),
        fecha_emision: first_date(row, ISSUED_KEYS),
        fecha_vencimiento: first_date(row, EXPIRY_KEYS),
        estado,
        archivo: first_string(row, FILE_KEYS),
    }
}
