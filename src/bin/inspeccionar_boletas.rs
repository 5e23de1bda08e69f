//! Script de inspección de boletas
//!
//! Lee la base MySQL del ERP y reporta las referencias de boletas por conductor
//! y vehículo, los números de boleta repetidos, las boletas de un rango de
//! fechas y los manifiestos cuya boleta no existe.
//!
//! Uso: `inspeccionar_boletas [DESDE] [HASTA]` (fechas `YYYY-MM-DD`; por
//! defecto los últimos 30 días).

use anyhow::{bail, Context, Result};
use chrono::{Duration, Local};
use colored::*;
use tracing::{info, warn};

use backoffice_residuos::config::{DatabaseConfig, EnvironmentConfig};
use backoffice_residuos::models::BoletaQuery;
use backoffice_residuos::repositories::BoletaRepository;
use backoffice_residuos::utils::coalesce::parse_flexible_date;

#[tokio::main]
async fn main() -> Result<()> {
    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();

    let query = parse_range(std::env::args().skip(1).collect())?;

    let database = DatabaseConfig::from_env().context("Configuración de base de datos inválida")?;
    info!("🔌 Conectando a MySQL...");
    let pool = database.create_pool().await.context("No se pudo conectar a MySQL")?;
    let repository = BoletaRepository::new(pool);

    println!("{}", "🔍 INSPECCIÓN DE BOLETAS".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());

    // Referencias por conductor
    section("👷 Boletas por conductor");
    let conductores = repository.references_per_conductor().await?;
    let sin_boletas = conductores.iter().filter(|r| r.boletas == 0).count();
    for row in conductores.iter().filter(|r| r.boletas > 0) {
        println!("  {:<12} {:>6}", row.clave, row.boletas);
    }
    println!(
        "  {} conductores, {} sin boletas (se pueden eliminar)",
        conductores.len(),
        sin_boletas
    );

    // Referencias por vehículo
    section("🚛 Boletas por vehículo");
    let vehiculos = repository.references_per_vehiculo().await?;
    let sin_boletas = vehiculos.iter().filter(|r| r.boletas == 0).count();
    for row in vehiculos.iter().filter(|r| r.boletas > 0) {
        println!("  {:<12} {:>6}", row.clave, row.boletas);
    }
    println!("  {} vehículos, {} sin boletas", vehiculos.len(), sin_boletas);

    // Números repetidos: la base no impone unicidad
    section("⚠️  Números de boleta repetidos");
    let duplicados = repository.duplicate_numeros().await?;
    if duplicados.is_empty() {
        println!("{}", "  ✅ Ninguno".bright_green());
    } else {
        warn!("⚠️ {} números de boleta repetidos", duplicados.len());
        for row in &duplicados {
            println!("  {}", format!("{:<12} x{}", row.numero, row.repeticiones).bright_red());
        }
    }

    // Boletas del rango
    section(&format!("🧾 Boletas entre {} y {}", query.desde, query.hasta));
    let boletas = repository.list_between(query.desde, query.hasta).await?;
    for boleta in &boletas {
        println!(
            "  {:<10} {} {:<10} {:<8} {:<10} {}",
            boleta.numero,
            boleta.fecha.format("%d/%m/%Y"),
            boleta.tipo,
            boleta.codigo_conductor.as_deref().unwrap_or("-"),
            boleta.placa.as_deref().unwrap_or("-"),
            boleta
                .net_weight()
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!("  {} boletas", boletas.len());

    // Manifiestos huérfanos
    section("📦 Manifiestos sin boleta");
    let huerfanos = repository.manifiestos_sin_boleta().await?;
    if huerfanos.is_empty() {
        println!("{}", "  ✅ Ninguno".bright_green());
    }
    for manifiesto in &huerfanos {
        println!(
            "  {}",
            format!(
                "{:<10} {} boleta {}",
                manifiesto.numero,
                manifiesto.fecha.format("%d/%m/%Y"),
                manifiesto.numero_boleta.as_deref().unwrap_or("-")
            )
            .bright_yellow()
        );
    }

    info!("✅ Inspección terminada");
    Ok(())
}

fn parse_range(args: Vec<String>) -> Result<BoletaQuery> {
    let today = Local::now().date_naive();
    let (desde, hasta) = match args.as_slice() {
        [] => (today - Duration::days(30), today),
        [desde] => (parse_date(desde)?, today),
        [desde, hasta, ..] => (parse_date(desde)?, parse_date(hasta)?),
    };
    BoletaQuery::new(desde, hasta).map_err(|e| anyhow::anyhow!(e.user_message()))
}

fn parse_date(raw: &str) -> Result<chrono::NaiveDate> {
    match parse_flexible_date(raw) {
        Some(date) => Ok(date),
        None => bail!("Fecha inválida: {}", raw),
    }
}

fn section(title: &str) {
    println!();
    println!("{}", title.bright_cyan().bold());
}
