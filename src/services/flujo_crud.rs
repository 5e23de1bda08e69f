//! Flujo CRUD de los modales de conductores, vehículos y clientes
//!
//! Máquina de estados:
//! `Listing → Selected → {Creating | Editing | ConfirmingDelete} → {Success | Error} → Listing`.
//!
//! Toda transición que modifica datos consulta antes el `PermissionGate`; una
//! negación deja un aviso descartable y no hace ninguna llamada de red.

use tracing::{info, warn};
use validator::Validate;

use crate::client::BackofficeApi;
use crate::dto::EntityForm;
use crate::services::entidades::CrudEntity;
use crate::services::filtro::{CategoryFilter, FilteredList, NavKey};
use crate::services::permisos::{CrudAction, PermissionGate};
use crate::utils::errors::{permission_denied, AppError};

/// Estado del modal
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState<F> {
    Listing,
    Selected {
        key: String,
    },
    Creating {
        draft: F,
    },
    /// La clave natural es de solo lectura
    Editing {
        key: String,
        draft: F,
    },
    /// `blocked` trae el mensaje cuando la entidad está referenciada;
    /// en ese caso solo se puede cancelar.
    ConfirmingDelete {
        key: String,
        blocked: Option<String>,
    },
    Success {
        message: String,
    },
    /// `resume` es el formulario al que se vuelve al descartar el error
    Error {
        message: String,
        focus: Option<String>,
        resume: Option<Box<WorkflowState<F>>>,
    },
}

pub struct CrudWorkflow<'a, E: CrudEntity> {
    api: &'a dyn BackofficeApi,
    gate: &'a PermissionGate,
    list: FilteredList<E>,
    state: WorkflowState<E::Form>,
    notice: Option<String>,
}

impl<'a, E: CrudEntity> CrudWorkflow<'a, E> {
    pub fn new(api: &'a dyn BackofficeApi, gate: &'a PermissionGate) -> Self {
        Self::with_list(api, gate, FilteredList::new(Vec::new()))
    }

    /// Usa una lista preconfigurada (categoría alternativa, orden, página)
    pub fn with_list(api: &'a dyn BackofficeApi, gate: &'a PermissionGate, list: FilteredList<E>) -> Self {
        Self {
            api,
            gate,
            list,
            state: WorkflowState::Listing,
            notice: None,
        }
    }

    pub fn state(&self) -> &WorkflowState<E::Form> {
        &self.state
    }

    pub fn list(&self) -> &FilteredList<E> {
        &self.list
    }

    /// Aviso descartable (permiso denegado)
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn selected(&self) -> Option<&E> {
        self.list.selected()
    }

    /// Borrador editable mientras se crea o edita
    pub fn draft_mut(&mut self) -> Option<&mut E::Form> {
        match &mut self.state {
            WorkflowState::Creating { draft } | WorkflowState::Editing { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Abre el modal: carga la lista
    pub async fn open(&mut self) {
        let result = E::fetch_all(self.api).await;

        match result {
            Ok(items) => {
                info!("📋 {} registros de {}", items.len(), E::SUBMODULE);
                self.list.set_source(items);
                self.state = WorkflowState::Listing;
            }
            Err(e) => {
                warn!("❌ Error cargando {}: {}", E::SUBMODULE, e);
                self.state = WorkflowState::Error {
                    message: e.user_message(),
                    focus: None,
                    resume: None,
                };
            }
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.list.set_search(term);
        self.sync_selection();
    }

    pub fn set_category(&mut self, category: CategoryFilter) {
        self.list.set_category(category);
        self.sync_selection();
    }

    pub fn select(&mut self, index: usize) {
        if self.is_browsing() {
            self.list.select(index);
            self.sync_selection();
        }
    }

    pub fn navigate(&mut self, key: NavKey) {
        if self.is_browsing() {
            self.list.navigate(key);
            self.sync_selection();
        }
    }

    pub fn begin_create(&mut self) {
        if !self.is_browsing() || !self.guard(CrudAction::Crear) {
            return;
        }
        self.state = WorkflowState::Creating {
            draft: E::Form::default(),
        };
    }

    pub fn begin_edit(&mut self) {
        let Some(item) = self.list.selected().cloned() else {
            return;
        };
        if !matches!(self.state, WorkflowState::Selected { .. }) || !self.guard(CrudAction::Editar) {
            return;
        }
        self.state = WorkflowState::Editing {
            key: item.key().to_string(),
            draft: item.to_form(),
        };
    }

    /// Guarda el formulario abierto (POST en alta, PUT en edición)
    pub async fn submit(&mut self) {
        let (action, key, draft) = match &self.state {
            WorkflowState::Creating { draft } => (CrudAction::Crear, None, draft.clone()),
            WorkflowState::Editing { key, draft } => (CrudAction::Editar, Some(key.clone()), draft.clone()),
            _ => return,
        };
        if !self.guard(action) {
            return;
        }

        let mut draft = draft.normalized();
        if let Some(key) = &key {
            draft.set_key(key);
        }
        let form_state = match &key {
            Some(key) => WorkflowState::Editing {
                key: key.clone(),
                draft: draft.clone(),
            },
            None => WorkflowState::Creating { draft: draft.clone() },
        };

        if let Err(errors) = draft.validate() {
            self.fail(AppError::from(errors), Some(form_state));
            return;
        }

        let result = match &key {
            Some(key) => E::update(self.api, key, &draft).await,
            None => E::create(self.api, &draft).await,
        };

        match result {
            Ok(()) => {
                let verb = if key.is_some() { "actualizado" } else { "creado" };
                info!("✅ {} {} {}", E::LABEL, draft.key(), verb);
                self.state = WorkflowState::Success {
                    message: format!("{} {} correctamente", E::LABEL, verb),
                };
                self.refresh().await;
            }
            Err(e) => self.fail(e, Some(form_state)),
        }
    }

    /// Abre la confirmación de borrado tras verificar las referencias
    pub async fn request_delete(&mut self) {
        let WorkflowState::Selected { key } = &self.state else {
            return;
        };
        let key = key.clone();
        if !self.guard(CrudAction::Eliminar) {
            return;
        }

        let result = E::count_references(self.api, &key).await;

        match result {
            Ok(0) => {
                self.state = WorkflowState::ConfirmingDelete { key, blocked: None };
            }
            Ok(count) => {
                let referenced = AppError::Referenced {
                    count,
                    message: format!(
                        "No se puede eliminar el {} {}: tiene {} boleta(s) asociada(s)",
                        E::LABEL.to_lowercase(),
                        key,
                        count
                    ),
                };
                warn!("⛔ {}", referenced);
                self.state = WorkflowState::ConfirmingDelete {
                    key,
                    blocked: Some(referenced.user_message()),
                };
            }
            Err(e) => self.fail(e, None),
        }
    }

    /// Confirma el borrado; con el diálogo bloqueado no hace nada
    pub async fn confirm_delete(&mut self) {
        let WorkflowState::ConfirmingDelete { key, blocked: None } = &self.state else {
            return;
        };
        let key = key.clone();
        if !self.guard(CrudAction::Eliminar) {
            return;
        }

        let result = E::remove(self.api, &key).await;

        match result {
            Ok(()) => {
                info!("🗑️ {} {} eliminado", E::LABEL, key);
                self.state = WorkflowState::Success {
                    message: format!("{} eliminado correctamente", E::LABEL),
                };
                self.refresh().await;
            }
            Err(e) => self.fail(e, None),
        }
    }

    /// Cierra el formulario o la confirmación sin guardar
    pub fn cancel(&mut self) {
        if matches!(
            self.state,
            WorkflowState::Creating { .. } | WorkflowState::Editing { .. } | WorkflowState::ConfirmingDelete { .. }
        ) {
            self.state = WorkflowState::Listing;
            self.sync_selection();
        }
    }

    /// Descarta el resultado de un intento
    pub fn dismiss(&mut self) {
        match std::mem::replace(&mut self.state, WorkflowState::Listing) {
            WorkflowState::Error {
                resume: Some(form), ..
            } => self.state = *form,
            WorkflowState::Success { .. } | WorkflowState::Error { .. } => {
                self.list.clear_selection();
            }
            other => {
                self.state = other;
            }
        }
    }

    fn is_browsing(&self) -> bool {
        matches!(self.state, WorkflowState::Listing | WorkflowState::Selected { .. })
    }

    fn sync_selection(&mut self) {
        if !self.is_browsing() {
            return;
        }
        self.state = match self.list.selected() {
            Some(item) => WorkflowState::Selected {
                key: item.key().to_string(),
            },
            None => WorkflowState::Listing,
        };
    }

    fn guard(&mut self, action: CrudAction) -> bool {
        if self.gate.can(E::MODULE, E::SUBMODULE, action) {
            return true;
        }
        let denied = permission_denied(action.label(), E::LABEL);
        warn!("🚫 {} (usuario {})", denied, self.gate.session().usuario_id);
        self.notice = Some(denied.user_message());
        false
    }

    fn fail(&mut self, error: AppError, form_state: Option<WorkflowState<E::Form>>) {
        warn!("❌ {}: {}", E::SUBMODULE, error);
        let focus = error.focus_field(<E::Form as EntityForm>::FIELDS);
        let resume = match focus {
            Some(_) => form_state.map(Box::new),
            None => None,
        };
        self.state = WorkflowState::Error {
            message: error.user_message(),
            focus,
            resume,
        };
    }

    async fn refresh(&mut self) {
        match E::fetch_all(self.api).await {
            Ok(items) => self.list.set_source(items),
            Err(e) => warn!("⚠️ No se pudo recargar {}: {}", E::SUBMODULE, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::VehicleForm;
    use crate::models::auth::{Permission, Session, UserRole};
    use crate::models::{Client, Driver, Vehicle};
    use crate::services::test_support::{client, driver, vehicle, FakeApi};

    fn gate(rol: UserRole, permisos: Vec<Permission>) -> PermissionGate {
        PermissionGate::new(Session {
            usuario_id: "7".to_string(),
            nombre: "Rosa".to_string(),
            rol,
            permisos,
        })
    }

    fn admin() -> PermissionGate {
        gate(UserRole::Admin, vec![])
    }

    fn plate_form(placa: &str) -> VehicleForm {
        VehicleForm {
            placa: placa.to_string(),
            marca: "Volvo".to_string(),
            nombre: "Tolva".to_string(),
            anotacion: None,
        }
    }

    #[tokio::test]
    async fn test_open_lists_and_selection_moves_state() {
        let api = FakeApi::with_drivers(vec![driver("C01", "Juan"), driver("C02", "Ana")]);
        let gate = admin();
        let mut flow: CrudWorkflow<Driver> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        assert_eq!(flow.state(), &WorkflowState::Listing);
        assert_eq!(flow.list().len(), 2);

        flow.select(1);
        assert_eq!(flow.state(), &WorkflowState::Selected { key: "C02".to_string() });

        flow.set_search("juan");
        assert_eq!(flow.state(), &WorkflowState::Listing);
        assert_eq!(flow.list().selected_index(), None);
    }

    #[tokio::test]
    async fn test_referenced_driver_never_deleted() {
        let api = FakeApi::with_drivers(vec![driver("C01", "Juan")]);
        api.set_reference_count("C01", 3);
        let gate = admin();
        let mut flow: CrudWorkflow<Driver> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        flow.select(0);
        flow.request_delete().await;

        match flow.state() {
            WorkflowState::ConfirmingDelete { key, blocked: Some(message) } => {
                assert_eq!(key, "C01");
                assert!(message.contains("3 boleta"));
            }
            other => panic!("estado inesperado: {:?}", other),
        }

        flow.confirm_delete().await;
        assert!(matches!(flow.state(), WorkflowState::ConfirmingDelete { .. }));
        assert!(!api.calls().iter().any(|c| c.starts_with("DELETE")));

        flow.cancel();
        assert_eq!(flow.state(), &WorkflowState::Selected { key: "C01".to_string() });
    }

    #[tokio::test]
    async fn test_unreferenced_driver_is_deleted_and_list_refetched() {
        let api = FakeApi::with_drivers(vec![driver("C01", "Juan"), driver("C02", "Ana")]);
        let gate = admin();
        let mut flow: CrudWorkflow<Driver> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        flow.select(0);
        flow.request_delete().await;
        assert_eq!(
            flow.state(),
            &WorkflowState::ConfirmingDelete { key: "C01".to_string(), blocked: None }
        );

        flow.confirm_delete().await;
        assert!(matches!(flow.state(), WorkflowState::Success { .. }));
        assert!(api.calls().contains(&"DELETE chofer C01".to_string()));
        assert_eq!(flow.list().len(), 1);

        // el éxito no se cierra solo
        assert!(matches!(flow.state(), WorkflowState::Success { .. }));
        flow.dismiss();
        assert_eq!(flow.state(), &WorkflowState::Listing);
    }

    #[tokio::test]
    async fn test_denied_delete_shows_notice_without_network() {
        let api = FakeApi::with_drivers(vec![driver("C01", "Juan")]);
        let gate = gate(
            UserRole::Usuario,
            vec![Permission::new("Transportes", "Lista de Conductores", "editar", true)],
        );
        let mut flow: CrudWorkflow<Driver> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        flow.select(0);
        let calls_before = api.calls().len();
        flow.request_delete().await;

        assert_eq!(flow.notice(), Some("Permiso Denegado: Eliminar Conductor"));
        assert_eq!(flow.state(), &WorkflowState::Selected { key: "C01".to_string() });
        assert_eq!(api.calls().len(), calls_before);

        flow.dismiss_notice();
        assert_eq!(flow.notice(), None);
    }

    #[tokio::test]
    async fn test_denied_create_keeps_listing() {
        let api = FakeApi::default();
        let gate = gate(UserRole::Usuario, vec![]);
        let mut flow: CrudWorkflow<Vehicle> = CrudWorkflow::new(&api, &gate);

        flow.begin_create();
        assert_eq!(flow.state(), &WorkflowState::Listing);
        assert_eq!(flow.notice(), Some("Permiso Denegado: Crear Vehículo"));
    }

    #[tokio::test]
    async fn test_duplicate_plate_focuses_placa() {
        let api = FakeApi::default();
        let gate = admin();
        let mut flow: CrudWorkflow<Vehicle> = CrudWorkflow::new(&api, &gate);
        flow.open().await;

        for attempt in 0..2 {
            flow.begin_create();
            *flow.draft_mut().unwrap() = plate_form("ABC123");
            flow.submit().await;
            if attempt == 0 {
                assert!(matches!(flow.state(), WorkflowState::Success { .. }));
                flow.dismiss();
            }
        }

        match flow.state() {
            WorkflowState::Error { message, focus, resume } => {
                assert!(message.contains("existe"));
                assert_eq!(focus.as_deref(), Some("placa"));
                assert!(resume.is_some());
            }
            other => panic!("estado inesperado: {:?}", other),
        }

        // al descartar se vuelve al formulario con el borrador intacto
        flow.dismiss();
        match flow.state() {
            WorkflowState::Creating { draft } => assert_eq!(draft.placa, "ABC123"),
            other => panic!("estado inesperado: {:?}", other),
        }
        let posts = api.calls().iter().filter(|c| c.starts_with("POST vehiculos")).count();
        assert_eq!(posts, 2);
    }

    #[tokio::test]
    async fn test_invalid_form_never_reaches_network() {
        let api = FakeApi::default();
        let gate = admin();
        let mut flow: CrudWorkflow<Vehicle> = CrudWorkflow::new(&api, &gate);

        flow.begin_create();
        flow.draft_mut().unwrap().marca = "Volvo".to_string();
        flow.submit().await;

        match flow.state() {
            WorkflowState::Error { focus, .. } => assert_eq!(focus.as_deref(), Some("placa")),
            other => panic!("estado inesperado: {:?}", other),
        }
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_edit_keeps_natural_key_read_only() {
        let api = FakeApi::with_vehicles(vec![vehicle("ABC123", "Volvo")]);
        let gate = admin();
        let mut flow: CrudWorkflow<Vehicle> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        flow.select(0);
        flow.begin_edit();
        {
            let draft = flow.draft_mut().unwrap();
            assert_eq!(draft.placa, "ABC123");
            draft.placa = "ZZZ999".to_string();
            draft.marca = "Scania".to_string();
        }
        flow.submit().await;

        assert!(matches!(flow.state(), WorkflowState::Success { .. }));
        assert!(api.calls().contains(&"PUT vehiculos ABC123".to_string()));
        assert_eq!(api.vehicles()[0].placa, "ABC123");
        assert_eq!(api.vehicles()[0].marca, "Scania");
    }

    #[tokio::test]
    async fn test_connection_error_returns_to_listing_on_dismiss() {
        let api = FakeApi::with_drivers(vec![driver("C01", "Juan")]);
        let gate = admin();
        let mut flow: CrudWorkflow<Driver> = CrudWorkflow::new(&api, &gate);
        flow.open().await;
        flow.select(0);

        api.go_offline();
        flow.request_delete().await;
        match flow.state() {
            WorkflowState::Error { message, focus, resume } => {
                assert_eq!(message, "Error de conexión con el servidor");
                assert!(focus.is_none());
                assert!(resume.is_none());
            }
            other => panic!("estado inesperado: {:?}", other),
        }
        flow.dismiss();
        assert_eq!(flow.state(), &WorkflowState::Listing);
    }

    #[tokio::test]
    async fn test_denied_client_edit_shows_notice() {
        let api = FakeApi::with_clients(vec![client("CL9", "Minera Sur")]);
        let gate = gate(
            UserRole::Usuario,
            vec![Permission::new("Comercial", "Lista de Clientes", "crear", true)],
        );
        let mut flow: CrudWorkflow<Client> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        flow.select(0);
        flow.begin_edit();

        assert_eq!(flow.notice(), Some("Permiso Denegado: Editar Cliente"));
        assert_eq!(flow.state(), &WorkflowState::Selected { key: "CL9".to_string() });
        assert!(!api.calls().iter().any(|c| c.starts_with("PUT")));
    }

    #[tokio::test]
    async fn test_invalid_second_email_focuses_email2() {
        let api = FakeApi::default();
        let gate = admin();
        let mut flow: CrudWorkflow<Client> = CrudWorkflow::new(&api, &gate);

        flow.begin_create();
        {
            let draft = flow.draft_mut().unwrap();
            draft.codigo = "CL9".to_string();
            draft.nombre = "Minera Sur".to_string();
            draft.email = Some("compras@minerasur.cl".to_string());
            draft.email2 = Some("no-es-correo".to_string());
        }
        flow.submit().await;

        match flow.state() {
            WorkflowState::Error { focus, resume, .. } => {
                assert_eq!(focus.as_deref(), Some("email2"));
                assert!(resume.is_some());
            }
            other => panic!("estado inesperado: {:?}", other),
        }
        assert!(api.calls().is_empty());

        flow.dismiss();
        match flow.state() {
            WorkflowState::Creating { draft } => assert_eq!(draft.email2.as_deref(), Some("no-es-correo")),
            other => panic!("estado inesperado: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_referenced_client_never_deleted() {
        let api = FakeApi::with_clients(vec![client("CL9", "Minera Sur")]);
        api.set_reference_count("CL9", 4);
        let gate = admin();
        let mut flow: CrudWorkflow<Client> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        flow.select(0);
        flow.request_delete().await;

        match flow.state() {
            WorkflowState::ConfirmingDelete { blocked: Some(message), .. } => {
                assert!(message.contains("cliente CL9"));
                assert!(message.contains("4 boleta"));
            }
            other => panic!("estado inesperado: {:?}", other),
        }
        flow.confirm_delete().await;

        assert!(api.calls().contains(&"GET check-cliente CL9".to_string()));
        assert!(!api.calls().iter().any(|c| c.starts_with("DELETE")));
        assert_eq!(api.clients().len(), 1);
    }

    #[tokio::test]
    async fn test_client_edit_sends_form() {
        let api = FakeApi::with_clients(vec![client("CL9", "Minera Sur")]);
        let gate = admin();
        let mut flow: CrudWorkflow<Client> = CrudWorkflow::new(&api, &gate);

        flow.open().await;
        flow.select(0);
        flow.begin_edit();
        {
            let draft = flow.draft_mut().unwrap();
            draft.nombre = "Minera Sur SpA".to_string();
            draft.email2 = Some("pagos@minerasur.cl".to_string());
        }
        flow.submit().await;

        assert!(matches!(flow.state(), WorkflowState::Success { .. }));
        assert!(api.calls().contains(&"PUT clientes CL9".to_string()));
        let stored = &api.clients()[0];
        assert_eq!(stored.nombre, "Minera Sur SpA");
        assert_eq!(stored.email2.as_deref(), Some("pagos@minerasur.cl"));
    }
}
