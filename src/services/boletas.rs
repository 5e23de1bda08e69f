//! Consulta de boletas por rango de fechas

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;

use crate::client::BackofficeApi;
use crate::models::{Boleta, BoletaQuery};
use crate::services::filtro::FilteredList;
use crate::utils::errors::{validation_error, AppResult};

impl BoletaQuery {
    pub fn new(desde: NaiveDate, hasta: NaiveDate) -> AppResult<Self> {
        if hasta < desde {
            return Err(validation_error("hasta", "La fecha final es anterior a la inicial"));
        }
        Ok(Self { desde, hasta })
    }
}

/// Totales de las boletas visibles
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoletaTotals {
    pub boletas: usize,
    pub peso_neto: Decimal,
    pub sin_peso: usize,
}

/// Carga las boletas del rango en una lista filtrable por tipo
pub async fn load_boletas(api: &dyn BackofficeApi, query: &BoletaQuery) -> AppResult<FilteredList<Boleta>> {
    let boletas = api.list_boletas(query).await?;
    info!("🧾 {} boletas entre {} y {}", boletas.len(), query.desde, query.hasta);
    Ok(FilteredList::new(boletas))
}

pub fn totals(boletas: &[&Boleta]) -> BoletaTotals {
    boletas.iter().fold(BoletaTotals::default(), |mut acc, boleta| {
        acc.boletas += 1;
        match boleta.net_weight() {
            Some(peso) => acc.peso_neto += peso,
            None => acc.sin_peso += 1,
        }
        acc
    })
}
