//! Consultas de solo lectura sobre `boletas` y `manifiestos`
//!
//! Las columnas numéricas de clave se convierten a texto en SQL para que las
//! filas mapeen directo a los modelos.

use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::debug;

use crate::models::boleta::{Boleta, DuplicateNumero, Manifiesto, ReferenceCount};
use crate::utils::errors::AppResult;

const BOLETA_COLUMNS: &str = r#"
    CAST(b.numero AS CHAR) AS numero,
    b.fecha AS fecha,
    COALESCE(b.tipo, '') AS tipo,
    CAST(b.codigo_conductor AS CHAR) AS codigo_conductor,
    b.placa AS placa,
    CAST(b.cliente AS CHAR) AS cliente,
    b.peso_bruto AS peso_bruto,
    b.peso_tara AS peso_tara,
    b.peso_neto AS peso_neto,
    b.cantidad AS cantidad
"#;

pub struct BoletaRepository {
    pool: MySqlPool,
}

impl BoletaRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Conteo de boletas por cada conductor registrado, incluidos los que no tienen
    pub async fn references_per_conductor(&self) -> AppResult<Vec<ReferenceCount>> {
        let rows = sqlx::query_as::<_, ReferenceCount>(
            r#"
            SELECT CAST(c.codigo AS CHAR) AS clave, COUNT(b.numero) AS boletas
            FROM conductores c
            LEFT JOIN boletas b ON b.codigo_conductor = c.codigo
            GROUP BY c.codigo
            ORDER BY boletas DESC, clave
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("📊 {} conductores con conteo de boletas", rows.len());
        Ok(rows)
    }

    /// Conteo de boletas por cada vehículo registrado
    pub async fn references_per_vehiculo(&self) -> AppResult<Vec<ReferenceCount>> {
        let rows = sqlx::query_as::<_, ReferenceCount>(
            r#"
            SELECT v.placa AS clave, COUNT(b.numero) AS boletas
            FROM vehiculos v
            LEFT JOIN boletas b ON UPPER(b.placa) = UPPER(v.placa)
            GROUP BY v.placa
            ORDER BY boletas DESC, clave
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("📊 {} vehículos con conteo de boletas", rows.len());
        Ok(rows)
    }

    /// Números de boleta que aparecen más de una vez
    pub async fn duplicate_numeros(&self) -> AppResult<Vec<DuplicateNumero>> {
        let rows = sqlx::query_as::<_, DuplicateNumero>(
            r#"
            SELECT CAST(numero AS CHAR) AS numero, COUNT(*) AS repeticiones
            FROM boletas
            GROUP BY numero
            HAVING COUNT(*) > 1
            ORDER BY repeticiones DESC, numero
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Boletas con fecha dentro del rango, ambos extremos incluidos
    pub async fn list_between(&self, desde: NaiveDate, hasta: NaiveDate) -> AppResult<Vec<Boleta>> {
        let sql = format!(
            "SELECT {} FROM boletas b WHERE b.fecha BETWEEN ? AND ? ORDER BY b.fecha, b.numero",
            BOLETA_COLUMNS
        );
        let rows = sqlx::query_as::<_, Boleta>(&sql)
            .bind(desde)
            .bind(hasta)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// Manifiestos cuyo número de boleta no existe en `boletas`
    pub async fn manifiestos_sin_boleta(&self) -> AppResult<Vec<Manifiesto>> {
        let rows = sqlx::query_as::<_, Manifiesto>(
            r#"
            SELECT CAST(m.numero AS CHAR) AS numero,
                   m.fecha AS fecha,
                   CAST(m.numero_boleta AS CHAR) AS numero_boleta,
                   CAST(m.cliente AS CHAR) AS cliente
            FROM manifiestos m
            LEFT JOIN boletas b ON b.numero = m.numero_boleta
            WHERE m.numero_boleta IS NOT NULL AND b.numero IS NULL
            ORDER BY m.fecha, m.numero
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
