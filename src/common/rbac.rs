// src/common/rbac.rs

use crate::models::auth::Role;

// Toda decisão de permissão do cliente passa por aqui, em vez de espalhar
// `if role == ADM` pelas telas. É só conveniência de interface: o servidor
// revalida cada operação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewCatalog,
    CreateOrder,
    EditPendingOrder,
    ApproveOrder,
    DeliverOrder,
    DownloadReceipt,
    ManageProducts,
    ManageChurches,
    ManageUsers,
    RegisterMovement,
    ViewMovements,
}

impl Action {
    pub fn label(self) -> &'static str {
        match self {
            Action::ViewCatalog => "consultar catálogo",
            Action::CreateOrder => "criar pedido",
            Action::EditPendingOrder => "editar pedido pendente",
            Action::ApproveOrder => "aprovar pedido",
            Action::DeliverOrder => "entregar pedido",
            Action::DownloadReceipt => "baixar recibo",
            Action::ManageProducts => "gerenciar produtos e categorias",
            Action::ManageChurches => "gerenciar igrejas",
            Action::ManageUsers => "gerenciar usuários",
            Action::RegisterMovement => "registrar movimentação de estoque",
            Action::ViewMovements => "consultar movimentações",
        }
    }
}

pub fn role_allows(role: Role, action: Action) -> bool {
    match (role, action) {
        (Role::Adm, _) => true,
        (
            Role::Usuario,
            Action::ViewCatalog
            | Action::CreateOrder
            | Action::EditPendingOrder
            | Action::ViewMovements,
        ) => true,
        (Role::Usuario, _) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adm_can_do_everything() {
        for action in [
            Action::ApproveOrder,
            Action::DeliverOrder,
            Action::DownloadReceipt,
            Action::ManageProducts,
            Action::ManageUsers,
            Action::RegisterMovement,
        ] {
            assert!(role_allows(Role::Adm, action));
        }
    }

    #[test]
    fn usuario_is_limited_to_ordering_and_reading() {
        assert!(role_allows(Role::Usuario, Action::CreateOrder));
        assert!(role_allows(Role::Usuario, Action::EditPendingOrder));
        assert!(role_allows(Role::Usuario, Action::ViewCatalog));

        assert!(!role_allows(Role::Usuario, Action::ApproveOrder));
        assert!(!role_allows(Role::Usuario, Action::DeliverOrder));
        assert!(!role_allows(Role::Usuario, Action::DownloadReceipt));
        assert!(!role_allows(Role::Usuario, Action::ManageProducts));
        assert!(!role_allows(Role::Usuario, Action::RegisterMovement));
    }
}
