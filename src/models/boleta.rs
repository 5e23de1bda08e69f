//! Modelo de Boleta (ticket de pesaje) y Manifiesto
//!
//! Mapea las filas de las tablas `boletas` y `manifiestos` de MySQL y las
//! respuestas JSON de `GET /api/boletas`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::services::filtro::Searchable;
use crate::utils::coalesce::de;

/// Boleta: vincula conductor, vehículo, cliente y la carga pesada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Boleta {
    #[serde(deserialize_with = "de::string_or_number")]
    pub numero: String,
    #[serde(deserialize_with = "de::flexible_date")]
    pub fecha: NaiveDate,
    #[serde(default)]
    pub tipo: String,
    #[serde(
        default,
        alias = "chofer",
        alias = "conductor",
        deserialize_with = "de::opt_string_or_number"
    )]
    pub codigo_conductor: Option<String>,
    #[serde(default)]
    pub placa: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string_or_number")]
    pub cliente: Option<String>,
    #[serde(default)]
    pub peso_bruto: Option<Decimal>,
    #[serde(default)]
    pub peso_tara: Option<Decimal>,
    #[serde(default)]
    pub peso_neto: Option<Decimal>,
    #[serde(default)]
    pub cantidad: Option<Decimal>,
}

impl Boleta {
    /// Peso neto informado, o bruto menos tara cuando no viene calculado
    pub fn net_weight(&self) -> Option<Decimal> {
        self.peso_neto.or_else(|| match (self.peso_bruto, self.peso_tara) {
            (Some(bruto), Some(tara)) => Some(bruto - tara),
            _ => None,
        })
    }
}

impl Searchable for Boleta {
    fn search_fields(&self) -> Vec<&str> {
        [
            Some(&self.numero),
            self.codigo_conductor.as_ref(),
            self.placa.as_ref(),
            self.cliente.as_ref(),
        ]
        .into_iter()
        .flatten()
        .map(String::as_str)
        .collect()
    }

    fn category(&self) -> Option<&str> {
        Some(self.tipo.as_str())
    }
}

/// Rango de fechas para listar boletas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoletaQuery {
    pub desde: NaiveDate,
    pub hasta: NaiveDate,
}

/// Manifiesto de despacho; tabla distinta a boletas pero relacionada en reportes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Manifiesto {
    pub numero: String,
    pub fecha: NaiveDate,
    pub numero_boleta: Option<String>,
    pub cliente: Option<String>,
}

/// Número de boleta repetido en la base (la unicidad no está garantizada)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct DuplicateNumero {
    pub numero: String,
    pub repeticiones: i64,
}

/// Conteo de boletas por clave (conductor o placa)
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ReferenceCount {
    pub clave: String,
    pub boletas: i64,
}
