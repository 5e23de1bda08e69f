use crate::models::auth::{Session, UserRole};

/// Acciones sujetas a permiso dentro de un submódulo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrudAction {
    Crear,
    Editar,
    Eliminar,
}

impl CrudAction {
    /// Nombre de la acción en la tabla de permisos
    pub fn as_str(&self) -> &'static str {
        match self {
            CrudAction::Crear => "crear",
            CrudAction::Editar => "editar",
            CrudAction::Eliminar => "eliminar",
        }
    }

    /// Etiqueta usada en los avisos
    pub fn label(&self) -> &'static str {
        match self {
            CrudAction::Crear => "Crear",
            CrudAction::Editar => "Editar",
            CrudAction::Eliminar => "Eliminar",
        }
    }
}

/// Servicio de autorización sobre la sesión en memoria
#[derive(Debug, Clone)]
pub struct PermissionGate {
    session: Session,
}

impl PermissionGate {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_admin(&self) -> bool {
        self.session.rol == UserRole::Admin
    }

    /// Verdadero para administradores; si no, exige la terna exacta habilitada
    pub fn has_permission(&self, module: &str, submodule: &str, action: &str) -> bool {
        if self.is_admin() {
            return true;
        }
        self.session.permisos.iter().any(|p| {
            p.habilitado && p.modulo == module && p.submodulo == submodule && p.accion == action
        })
    }

    pub fn can(&self, module: &str, submodule: &str, action: CrudAction) -> bool {
        self.has_permission(module, submodule, action.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Permission;

    fn session(rol: UserRole, permisos: Vec<Permission>) -> Session {
        Session {
            usuario_id: "7".to_string(),
            nombre: "Rosa".to_string(),
            rol,
            permisos,
        }
    }

    #[test]
    fn test_admin_has_every_permission() {
        let gate = PermissionGate::new(session(UserRole::Admin, vec![]));
        assert!(gate.has_permission("Transportes", "Lista de Conductores", "eliminar"));
        assert!(gate.has_permission("Cualquiera", "Otro", "accion"));
    }

    #[test]
    fn test_user_needs_exact_enabled_triple() {
        let gate = PermissionGate::new(session(
            UserRole::Usuario,
            vec![
                Permission::new("Transportes", "Lista de Conductores", "crear", true),
                Permission::new("Transportes", "Lista de Conductores", "editar", false),
                Permission::new("Transportes", "Lista de Vehículos", "eliminar", true),
            ],
        ));

        assert!(gate.can("Transportes", "Lista de Conductores", CrudAction::Crear));
        // deshabilitado
        assert!(!gate.can("Transportes", "Lista de Conductores", CrudAction::Editar));
        // la terna debe coincidir completa
        assert!(!gate.can("Transportes", "Lista de Conductores", CrudAction::Eliminar));
        assert!(!gate.has_permission("transportes", "Lista de Conductores", "crear"));
        assert!(gate.can("Transportes", "Lista de Vehículos", CrudAction::Eliminar));
    }
}
