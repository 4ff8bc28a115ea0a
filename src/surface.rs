//! Access-gated surfaces
//!
//! Screens, navigation entries and mutating operations each declare the capability
//! they need. Navigation omits entries the user cannot reach, screen entry yields an
//! explicit denial, and operations are gated by their own manage capability
//! regardless of the screen's view capability.

use serde::{Deserialize, Serialize};

use crate::authz::Authorizer;
use crate::catalog::PermissionCode;
use crate::constants::ACCESS_DENIED;
use crate::entity::User;
use crate::error::Result;
use crate::read::GroupStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Screen {
    Dashboard,
    Stock,
    Users,
    Groups,
    BackendExport,
}

impl Screen {
    /// Navigation order
    pub const ALL: [Screen; 5] = [Screen::Dashboard, Screen::Stock, Screen::Users, Screen::Groups, Screen::BackendExport];

    /// Capability required to enter; `None` means always reachable
    pub fn required(self) -> Option<PermissionCode> {
        match self {
            Screen::Dashboard => None,
            Screen::Stock => Some(PermissionCode::ViewStock),
            Screen::Users => Some(PermissionCode::ViewUsers),
            Screen::Groups => Some(PermissionCode::ViewGroups),
            Screen::BackendExport => Some(PermissionCode::ViewBackendCode),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Screen::Dashboard => "Dashboard",
            Screen::Stock => "Inventory",
            Screen::Users => "Users",
            Screen::Groups => "Groups & Perms",
            Screen::BackendExport => "Get Source Code",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Screen::Dashboard => "dashboard",
            Screen::Stock => "stock",
            Screen::Users => "users",
            Screen::Groups => "groups",
            Screen::BackendExport => "backend_export",
        }
    }

    pub fn from_key(key: &str) -> Option<Screen> {
        Screen::ALL.into_iter().find(|s| s.key() == key)
    }

    /// Operations exposed inside this screen
    pub fn operations(self) -> &'static [Operation] {
        match self {
            Screen::Stock => &[Operation::CreateProduct, Operation::EditProduct, Operation::DeleteProduct],
            Screen::Users => &[Operation::AddUser, Operation::DeleteUser, Operation::AssignGroup],
            Screen::Groups => &[Operation::CreateGroup, Operation::TogglePermission, Operation::DeleteGroup],
            Screen::Dashboard | Screen::BackendExport => &[],
        }
    }
}

/// Mutating actions offered inside a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    CreateProduct,
    EditProduct,
    DeleteProduct,
    AddUser,
    DeleteUser,
    AssignGroup,
    CreateGroup,
    TogglePermission,
    DeleteGroup,
}

impl Operation {
    pub fn required(self) -> PermissionCode {
        match self {
            Operation::CreateProduct | Operation::EditProduct | Operation::DeleteProduct => PermissionCode::ManageStock,
            Operation::AddUser | Operation::DeleteUser | Operation::AssignGroup => PermissionCode::ManageUsers,
            Operation::CreateGroup | Operation::TogglePermission | Operation::DeleteGroup => PermissionCode::ManageGroups,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub screen: Screen,
    pub label: &'static str,
    pub key: &'static str,
}

/// Result of entering a screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Entry {
    /// Screen content with the operations the user may perform; empty means read-only
    Granted { screen: Screen, operations: Vec<Operation> },
    Denied { screen: Screen, message: &'static str },
}

impl Entry {
    pub fn is_granted(&self) -> bool {
        matches!(self, Entry::Granted { .. })
    }
}

impl<'a, G: GroupStore + ?Sized> Authorizer<'a, G> {
    pub fn can_enter(&self, user: &User, screen: Screen) -> bool {
        screen.required().map_or(true, |code| self.can_perform(user, code))
    }

    /// Navigation entries to render. Denied entries are absent, not disabled.
    pub fn navigation(&self, user: &User) -> Vec<NavEntry> {
        Screen::ALL
            .into_iter()
            .filter(|&s| self.can_enter(user, s))
            .map(|screen| NavEntry { screen, label: screen.label(), key: screen.key() })
            .collect()
    }

    /// Enter a screen directly, bypassing navigation
    pub fn enter(&self, user: &User, screen: Screen) -> Entry {
        if !self.can_enter(user, screen) {
            return Entry::Denied { screen, message: ACCESS_DENIED };
        }
        let operations = screen.operations().iter().copied().filter(|op| self.can_perform(user, op.required())).collect();
        Entry::Granted { screen, operations }
    }

    /// Gate a mutating operation on its own manage capability
    pub fn authorize(&self, user: &User, op: Operation) -> Result<()> {
        self.require(user, op.required())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::UserGroup;

    fn groups() -> Vec<UserGroup> {
        vec![
            UserGroup::new("g1", "Stock Managers").with_permissions(["p1", "p2"]),
            UserGroup::new("g2", "Auditors").with_permissions(["p1", "p3", "p5"]),
        ]
    }

    fn nav(a: &Authorizer<Vec<UserGroup>>, u: &User) -> Vec<Screen> {
        a.navigation(u).into_iter().map(|e| e.screen).collect()
    }

    #[test]
    fn navigation_omits_denied_entries() {
        let g = groups();
        let a = Authorizer::new(&g);
        assert_eq!(nav(&a, &User::admin("u1", "admin")), Screen::ALL.to_vec());
        assert_eq!(nav(&a, &User::new("u2", "bob").in_group("g1")), vec![Screen::Dashboard, Screen::Stock]);
        assert_eq!(nav(&a, &User::new("u4", "guest")), vec![Screen::Dashboard]);
    }

    #[test]
    fn direct_entry_is_denied_explicitly() {
        let g = groups();
        let a = Authorizer::new(&g);
        let guest = User::new("u4", "guest");
        assert_eq!(a.enter(&guest, Screen::Users), Entry::Denied { screen: Screen::Users, message: "Access Denied" });
        assert!(a.enter(&guest, Screen::Dashboard).is_granted());
    }

    #[test]
    fn view_does_not_imply_manage() {
        let g = groups();
        let a = Authorizer::new(&g);
        let alice = User::new("u3", "auditor_alice").in_group("g2");
        assert_eq!(a.enter(&alice, Screen::Stock), Entry::Granted { screen: Screen::Stock, operations: vec![] });
        assert!(a.authorize(&alice, Operation::DeleteProduct).is_err());

        let bob = User::new("u2", "bob").in_group("g1");
        assert_eq!(
            a.enter(&bob, Screen::Stock),
            Entry::Granted {
                screen: Screen::Stock,
                operations: vec![Operation::CreateProduct, Operation::EditProduct, Operation::DeleteProduct]
            }
        );
        assert!(a.authorize(&bob, Operation::DeleteProduct).is_ok());
    }

    #[test]
    fn every_manage_operation_maps_to_a_manage_code() {
        for s in Screen::ALL {
            for op in s.operations() {
                assert!(op.required().as_str().starts_with("MANAGE_"));
            }
        }
    }

    #[test]
    fn screen_keys_roundtrip() {
        for s in Screen::ALL {
            assert_eq!(Screen::from_key(s.key()), Some(s));
        }
        assert_eq!(Screen::from_key("settings"), None);
    }
}
