//! Coalescencia de campos para respuestas JSON heterogéneas
//!
//! La API devuelve la misma información con nombres de campo distintos según
//! el endpoint (`documento_id` vs `docu_id`, `count` vs `cantidad`). Estas
//! funciones prueban nombres alternativos en orden y omiten los `null`.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::models::document::DocumentStatus;

/// Primer valor no nulo entre las claves dadas, en orden
pub fn first_present<'a>(row: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find(|value| !value.is_null())
}

/// Primer valor como texto; los números se convierten a su representación decimal
pub fn first_string(row: &Value, keys: &[&str]) -> Option<String> {
    first_present(row, keys).and_then(value_to_string)
}

/// Primer valor como entero; acepta números y cadenas numéricas
pub fn first_i64(row: &Value, keys: &[&str]) -> Option<i64> {
    first_present(row, keys).and_then(|value| match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Primer valor como fecha (`YYYY-MM-DD` o timestamp ISO)
pub fn first_date(row: &Value, keys: &[&str]) -> Option<NaiveDate> {
    first_present(row, keys)
        .and_then(Value::as_str)
        .and_then(parse_flexible_date)
}

/// Localiza la lista de filas de una respuesta: el cuerpo mismo si es un
/// arreglo, o la primera clave de `keys` que contenga un arreglo.
pub fn extract_rows(body: &Value, keys: &[&str]) -> Vec<Value> {
    if let Value::Array(rows) = body {
        return rows.clone();
    }
    keys.iter()
        .filter_map(|key| body.get(*key))
        .find_map(|value| value.as_array().cloned())
        .unwrap_or_default()
}

/// Interpreta fechas `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS...` o `DD/MM/YYYY`
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(head, "%d/%m/%Y"))
        .ok()
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserializadores tolerantes para los DTOs de la API
pub mod de {
    use super::*;
    use serde::de::Error;

    /// Acepta un identificador como número o cadena y lo normaliza a `String`
    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        value_to_string(&value)
            .ok_or_else(|| D::Error::custom(format!("se esperaba texto o número, llegó {}", value)))
    }

    /// Como `string_or_number`, pero `null` o ausente es `None`
    pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().and_then(value_to_string))
    }

    /// Fecha tolerante; error si el texto no es una fecha reconocible
    pub fn flexible_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_flexible_date(&raw).ok_or_else(|| D::Error::custom(format!("fecha inválida: {}", raw)))
    }

    /// Estado de documentación tolerante: `null` o ausente es `Sin Documentos`
    /// y cualquier valor no reconocido es `Desconocido`
    pub fn document_status<'de, D>(deserializer: D) -> Result<DocumentStatus, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => DocumentStatus::default(),
            Some(value @ Value::String(_)) => {
                serde_json::from_value(value).unwrap_or(DocumentStatus::Desconocido)
            }
            Some(_) => DocumentStatus::Desconocido,
        })
    }

    /// Booleano de MySQL: `true/false`, `1/0` o `"1"/"0"`
    pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(b),
            Value::Number(n) => Ok(n.as_i64().unwrap_or(0) != 0),
            Value::String(s) => Ok(matches!(s.trim(), "1" | "true" | "si" | "sí")),
            Value::Null => Ok(false),
            other => Err(D::Error::custom(format!("booleano inválido: {}", other))),
        }
    }
}
