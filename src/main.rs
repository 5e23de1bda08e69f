use anyhow::{Context, Result};
use colored::*;
use std::io::{self, Write};
use tracing::{error, info};

use backoffice_residuos::client::{BackofficeApi, HttpBackofficeClient};
use backoffice_residuos::config::EnvironmentConfig;
use backoffice_residuos::dto::{ClientForm, DriverForm, VehicleForm};
use backoffice_residuos::models::{BoletaQuery, Client, DocumentScope, DocumentStatus, Driver, Vehicle};
use backoffice_residuos::services::boletas::{load_boletas, totals};
use backoffice_residuos::services::documentos::load_documents;
use backoffice_residuos::services::{
    CategoryFilter, CrudEntity, CrudWorkflow, FilteredList, NavKey, PermissionGate, WorkflowState,
};
use backoffice_residuos::utils::coalesce::parse_flexible_date;

#[tokio::main]
async fn main() -> Result<()> {
    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;

    // Los logs van a stderr para no mezclarse con el menú
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(io::stderr)
        .init();

    println!("{}", "♻️  Back-office de Residuos".bright_blue().bold());
    println!("{}", "=====================================".bright_blue());
    println!("API: {} ({})", config.api_base_url, config.environment);
    println!();

    let mut client = HttpBackofficeClient::new(&config.api_base_url, config.http_timeout)?;

    // Paso 1: iniciar sesión
    let session = loop {
        println!("{}", "🔐 INICIAR SESIÓN".bright_cyan().bold());
        let usuario = prompt("Usuario: ")?;
        let clave = prompt("Clave: ")?;
        match client.login(&usuario, &clave).await {
            Ok(session) => break session,
            Err(e) => {
                error!("❌ Login fallido: {}", e);
                println!("{}", format!("❌ {}", e.user_message()).bright_red());
            }
        }
    };
    println!(
        "{}",
        format!("✅ Bienvenido, {} ({})", session.nombre, session.rol.as_str()).bright_green()
    );
    info!("🪪 Peticiones identificadas como usuario {}", client.usuario_id().unwrap_or("-"));
    let gate = PermissionGate::new(session);

    // Paso 2: menú principal
    loop {
        println!();
        println!("{}", "📋 MENÚ PRINCIPAL".bright_green().bold());
        println!("{}", "==================".bright_green());
        println!("1. 👷 Conductores");
        println!("2. 🚛 Vehículos");
        println!("3. 🏢 Clientes");
        println!("4. 🧾 Boletas por fecha");
        println!("5. 🚪 Salir");
        let choice = prompt("Selecciona una opción (1-5): ")?;

        match choice.as_str() {
            "1" => run_entity::<Driver>(&client, &gate, &config).await?,
            "2" => run_entity::<Vehicle>(&client, &gate, &config).await?,
            "3" => run_entity::<Client>(&client, &gate, &config).await?,
            "4" => run_boletas(&client, &config).await?,
            "5" => {
                println!("{}", "👋 ¡Hasta luego!".bright_green());
                break;
            }
            _ => println!("{}", "❌ Opción inválida. Intenta de nuevo.".bright_red()),
        }
    }

    Ok(())
}

/// Presentación de cada entidad en la consola
trait ConsoleEntity: CrudEntity {
    const DOCUMENTS: Option<DocumentScope>;

    fn configure(list: FilteredList<Self>) -> FilteredList<Self> {
        list
    }

    fn row(&self) -> String;

    fn fill_form(form: &mut Self::Form, editing: bool) -> io::Result<()>;
}

impl ConsoleEntity for Driver {
    const DOCUMENTS: Option<DocumentScope> = Some(DocumentScope::Conductor);

    fn configure(mut list: FilteredList<Self>) -> FilteredList<Self> {
        list.sort_by(|d| d.nombre.as_str());
        list
    }

    fn row(&self) -> String {
        format!(
            "{:<10} {:<30} {:<12} {}",
            self.codigo,
            self.nombre,
            self.telefono.as_deref().unwrap_or("-"),
            paint_status(&self.estado_documentacion)
        )
    }

    fn fill_form(form: &mut DriverForm, editing: bool) -> io::Result<()> {
        if !editing {
            form.codigo = prompt_default("Código", &form.codigo)?;
        }
        form.nombre = prompt_default("Nombre", &form.nombre)?;
        form.telefono = prompt_optional("Teléfono", form.telefono.as_deref())?;
        Ok(())
    }
}

impl ConsoleEntity for Vehicle {
    const DOCUMENTS: Option<DocumentScope> = Some(DocumentScope::Vehiculo);

    fn configure(list: FilteredList<Self>) -> FilteredList<Self> {
        list.with_category_fn(Vehicle::brand)
    }

    fn row(&self) -> String {
        format!(
            "{:<10} {:<15} {:<20} {}",
            self.placa,
            self.marca,
            self.nombre,
            paint_status(&self.estado_documentacion)
        )
    }

    fn fill_form(form: &mut VehicleForm, editing: bool) -> io::Result<()> {
        if !editing {
            form.placa = prompt_default("Placa", &form.placa)?;
        }
        form.marca = prompt_default("Marca", &form.marca)?;
        form.nombre = prompt_default("Nombre", &form.nombre)?;
        form.anotacion = prompt_optional("Anotación", form.anotacion.as_deref())?;
        Ok(())
    }
}

impl ConsoleEntity for Client {
    const DOCUMENTS: Option<DocumentScope> = None;

    fn row(&self) -> String {
        format!(
            "{:<10} {:<35} {}",
            self.codigo,
            self.nombre,
            self.email.as_deref().unwrap_or("-")
        )
    }

    fn fill_form(form: &mut ClientForm, editing: bool) -> io::Result<()> {
        if !editing {
            form.codigo = prompt_default("Código", &form.codigo)?;
        }
        form.nombre = prompt_default("Razón social", &form.nombre)?;
        form.email = prompt_optional("Email", form.email.as_deref())?;
        form.email2 = prompt_optional("Email 2", form.email2.as_deref())?;
        Ok(())
    }
}

async fn run_entity<E: ConsoleEntity>(
    client: &HttpBackofficeClient,
    gate: &PermissionGate,
    config: &EnvironmentConfig,
) -> Result<()> {
    let api: &dyn BackofficeApi = client;
    let list = E::configure(FilteredList::new(Vec::new()).with_page_size(config.list_page_size));
    let mut workflow = CrudWorkflow::<E>::with_list(api, gate, list);
    workflow.open().await;
    info!("📂 Abierto {}", E::SUBMODULE);

    loop {
        if let Some(notice) = workflow.notice() {
            println!("{}", format!("🚫 {}", notice).bright_red().bold());
            workflow.dismiss_notice();
        }

        match workflow.state().clone() {
            WorkflowState::Success { message } => {
                println!("{}", format!("✅ {}", message).bright_green());
                workflow.dismiss();
            }
            WorkflowState::Error { message, focus, .. } => {
                println!("{}", format!("❌ {}", message).bright_red());
                if let Some(field) = focus {
                    println!("{}", format!("👉 Corrige el campo: {}", field).bright_yellow());
                }
                prompt("Enter para continuar...")?;
                workflow.dismiss();
            }
            WorkflowState::Creating { .. } | WorkflowState::Editing { .. } => {
                let editing = matches!(workflow.state(), WorkflowState::Editing { .. });
                let title = if editing { "✏️  EDITAR" } else { "➕ NUEVO" };
                println!("{}", format!("{} {}", title, E::LABEL.to_uppercase()).bright_cyan().bold());
                if let Some(draft) = workflow.draft_mut() {
                    E::fill_form(draft, editing)?;
                }
                if confirm("¿Guardar? (s/n): ")? {
                    workflow.submit().await;
                } else {
                    workflow.cancel();
                }
            }
            WorkflowState::ConfirmingDelete { key, blocked } => match blocked {
                Some(message) => {
                    println!("{}", format!("⛔ {}", message).bright_red());
                    prompt("Enter para volver...")?;
                    workflow.cancel();
                }
                None => {
                    let question = format!("¿Eliminar {} {}? (s/n): ", E::LABEL.to_lowercase(), key);
                    if confirm(&question)? {
                        workflow.confirm_delete().await;
                    } else {
                        workflow.cancel();
                    }
                }
            },
            WorkflowState::Listing | WorkflowState::Selected { .. } => {
                render_list(workflow.list(), E::row);
                let command = prompt(
                    "[j/k] mover  [n/p] página  [#] elegir  [/texto] buscar  [c cat] categoría  \
                     [a] nuevo  [e] editar  [d] eliminar  [v] documentos  [q] volver: ",
                )?;

                match command.as_str() {
                    "q" => return Ok(()),
                    "j" => workflow.navigate(NavKey::Down),
                    "k" => workflow.navigate(NavKey::Up),
                    "n" => workflow.navigate(NavKey::PageDown),
                    "p" => workflow.navigate(NavKey::PageUp),
                    "g" => workflow.navigate(NavKey::Home),
                    "G" => workflow.navigate(NavKey::End),
                    "a" => workflow.begin_create(),
                    "e" => workflow.begin_edit(),
                    "d" => workflow.request_delete().await,
                    "v" => match (E::DOCUMENTS, workflow.selected()) {
                        (Some(scope), Some(item)) => show_documents(api, scope, item.key()).await,
                        (None, _) => println!("{}", "ℹ️  Esta entidad no tiene documentos".bright_yellow()),
                        (_, None) => println!("{}", "ℹ️  Selecciona una fila primero".bright_yellow()),
                    },
                    "c" => {
                        println!("Categorías: {}", workflow.list().categories().join(", "));
                        workflow.set_category(CategoryFilter::All);
                    }
                    other => {
                        if let Some(term) = other.strip_prefix('/') {
                            workflow.set_search(term.trim());
                        } else if let Some(label) = other.strip_prefix("c ") {
                            workflow.set_category(CategoryFilter::from_label(label.trim()));
                        } else if let Ok(number) = other.parse::<usize>() {
                            workflow.select(number.saturating_sub(1));
                        } else {
                            println!("{}", "❌ Comando inválido".bright_red());
                        }
                    }
                }
            }
        }
    }
}

fn render_list<T: backoffice_residuos::services::Searchable>(list: &FilteredList<T>, row: fn(&T) -> String) {
    println!();
    let filter = match list.category_filter() {
        CategoryFilter::All => "Todos".to_string(),
        CategoryFilter::Exact(label) => label.clone(),
    };
    println!(
        "{}",
        format!(
            "🔎 '{}' | categoría: {} | {} de {} filas",
            list.search_term(),
            filter,
            list.len(),
            list.source().len()
        )
        .bright_blue()
    );

    if list.is_empty() {
        println!("{}", "  (sin resultados)".dimmed());
        return;
    }

    let page_size = list.page_size();
    let page_start = list.selected_index().map(|i| i / page_size * page_size).unwrap_or(0);
    let page_end = (page_start + page_size).min(list.len());
    for index in page_start..page_end {
        if let Some(item) = list.get(index) {
            let line = format!("{:>4}. {}", index + 1, row(item));
            if list.selected_index() == Some(index) {
                println!("{}", line.on_blue().bold());
            } else {
                println!("{}", line);
            }
        }
    }
}

async fn show_documents(api: &dyn BackofficeApi, scope: DocumentScope, key: &str) {
    println!();
    println!("{}", format!("📄 DOCUMENTOS DE {}", key).bright_cyan().bold());
    match load_documents(api, scope, key).await {
        Ok(documents) if documents.is_empty() => println!("{}", "  (sin documentos configurados)".dimmed()),
        Ok(documents) => {
            for doc in documents {
                let vencimiento = doc
                    .fecha_vencimiento
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| "-".to_string());
                let estado = if doc.is_registered() {
                    doc.estado.bright_green()
                } else {
                    doc.estado.bright_red()
                };
                println!("  {:<35} vence {:<12} {}", doc.nombre, vencimiento, estado);
            }
        }
        Err(e) => println!("{}", format!("❌ {}", e.user_message()).bright_red()),
    }
}

async fn run_boletas(client: &HttpBackofficeClient, config: &EnvironmentConfig) -> Result<()> {
    println!("{}", "🧾 BOLETAS POR FECHA".bright_cyan().bold());
    let Some(desde) = parse_flexible_date(&prompt("Desde (YYYY-MM-DD): ")?) else {
        println!("{}", "❌ Fecha inválida".bright_red());
        return Ok(());
    };
    let Some(hasta) = parse_flexible_date(&prompt("Hasta (YYYY-MM-DD): ")?) else {
        println!("{}", "❌ Fecha inválida".bright_red());
        return Ok(());
    };
    let query = match BoletaQuery::new(desde, hasta) {
        Ok(query) => query,
        Err(e) => {
            println!("{}", format!("❌ {}", e.user_message()).bright_red());
            return Ok(());
        }
    };

    let mut list = match load_boletas(client, &query).await {
        Ok(list) => list.with_page_size(config.list_page_size),
        Err(e) => {
            println!("{}", format!("❌ {}", e.user_message()).bright_red());
            return Ok(());
        }
    };

    loop {
        render_list(&list, |b| {
            format!(
                "{:<10} {} {:<10} {:<8} {:<10} {}",
                b.numero,
                b.fecha.format("%d/%m/%Y"),
                b.tipo,
                b.codigo_conductor.as_deref().unwrap_or("-"),
                b.placa.as_deref().unwrap_or("-"),
                b.net_weight().map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
            )
        });
        let summary = totals(&list.items());
        println!(
            "{}",
            format!(
                "Σ {} boletas, {} kg netos ({} sin peso)",
                summary.boletas, summary.peso_neto, summary.sin_peso
            )
            .bright_green()
        );
        println!("Tipos: {}", list.categories().join(", "));

        let command = prompt("[/texto] buscar  [c tipo] filtrar  [j/k/n/p] mover  [q] volver: ")?;
        match command.as_str() {
            "q" => return Ok(()),
            "j" => {
                list.navigate(NavKey::Down);
            }
            "k" => {
                list.navigate(NavKey::Up);
            }
            "n" => {
                list.navigate(NavKey::PageDown);
            }
            "p" => {
                list.navigate(NavKey::PageUp);
            }
            "c" => list.set_category(CategoryFilter::All),
            other => {
                if let Some(term) = other.strip_prefix('/') {
                    list.set_search(term.trim());
                } else if let Some(label) = other.strip_prefix("c ") {
                    list.set_category(CategoryFilter::from_label(label.trim()));
                } else {
                    println!("{}", "❌ Comando inválido".bright_red());
                }
            }
        }
    }
}

fn paint_status(status: &DocumentStatus) -> ColoredString {
    match status {
        DocumentStatus::Vigente => status.as_str().bright_green(),
        DocumentStatus::VigentePorVencer => status.as_str().bright_yellow(),
        DocumentStatus::DocVencidos => status.as_str().bright_red(),
        _ => status.as_str().dimmed(),
    }
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Enter vacío conserva el valor actual
fn prompt_default(label: &str, current: &str) -> io::Result<String> {
    let value = prompt(&format!("{} [{}]: ", label, current))?;
    Ok(if value.is_empty() { current.to_string() } else { value })
}

/// Enter vacío conserva el valor; `-` lo borra
fn prompt_optional(label: &str, current: Option<&str>) -> io::Result<Option<String>> {
    let value = prompt(&format!("{} [{}]: ", label, current.unwrap_or("")))?;
    Ok(match value.as_str() {
        "" => current.map(str::to_string),
        "-" => None,
        _ => Some(value),
    })
}

fn confirm(question: &str) -> io::Result<bool> {
    let answer = prompt(question)?;
    Ok(matches!(answer.to_lowercase().as_str(), "s" | "si" | "sí" | "y"))
}
