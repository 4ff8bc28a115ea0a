//! Authorization engine
//!
//! `can_perform` is the single decision function. It is pure with respect to its
//! inputs: it never mutates the stores and never returns an error. Every ambiguous
//! or malformed input resolves to a denial.

use tracing::{debug, warn};

use crate::catalog::{PermissionCatalog, PermissionCode};
use crate::entity::User;
use crate::error::{Result, StockguardError};
use crate::read::GroupStore;

/// Decide whether `user` may exercise the capability named by `required`.
///
/// Checks, in order: admin bypass, group assignment, group resolution,
/// capability resolution, membership.
pub fn can_perform<G: GroupStore + ?Sized>(user: &User, required: &str, groups: &G, catalog: &PermissionCatalog) -> bool {
    if user.is_admin {
        return true;
    }
    let Some(group_id) = user.group() else {
        debug!(user = %user.username, required, "denied: no group");
        return false;
    };
    let group = match groups.group_by_id(group_id) {
        Ok(Some(g)) => g,
        Ok(None) => {
            debug!(user = %user.username, group = group_id, required, "denied: group not found");
            return false;
        }
        Err(e) => {
            warn!(user = %user.username, group = group_id, error = %e, "group lookup failed, denying");
            return false;
        }
    };
    let Some(permission) = catalog.find_by_code(required) else {
        debug!(user = %user.username, required, "denied: unknown capability");
        return false;
    };
    group.grants(&permission.id)
}

/// Engine bound to a group store and catalog
pub struct Authorizer<'a, G: ?Sized> {
    groups: &'a G,
    catalog: &'a PermissionCatalog,
}

impl<'a, G: GroupStore + ?Sized> Authorizer<'a, G> {
    /// Use the standard catalog
    pub fn new(groups: &'a G) -> Self {
        Authorizer { groups, catalog: PermissionCatalog::standard() }
    }

    pub fn with_catalog(groups: &'a G, catalog: &'a PermissionCatalog) -> Self {
        Authorizer { groups, catalog }
    }

    pub fn catalog(&self) -> &'a PermissionCatalog {
        self.catalog
    }

    #[inline]
    pub fn can_perform(&self, user: &User, required: impl AsRef<str>) -> bool {
        can_perform(user, required.as_ref(), self.groups, self.catalog)
    }

    /// Fail with `AccessDenied` unless the capability is granted
    pub fn require(&self, user: &User, required: PermissionCode) -> Result<()> {
        if self.can_perform(user, required) {
            Ok(())
        } else {
            Err(StockguardError::AccessDenied {
                user: user.username.clone(),
                capability: required.to_string(),
            })
        }
    }

    /// Every catalog capability the user currently holds, in catalog order
    pub fn granted(&self, user: &User) -> Vec<PermissionCode> {
        self.catalog.list().iter().map(|p| p.code).filter(|c| self.can_perform(user, c)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Permission;
    use crate::entity::UserGroup;

    fn groups() -> Vec<UserGroup> {
        vec![
            UserGroup::new("g1", "Stock Managers").with_permissions(["p1", "p2"]),
            UserGroup::new("g2", "Auditors").with_permissions(["p1", "p3", "p5"]),
            UserGroup::new("g3", "Ghosts").with_permissions(["p42"]),
        ]
    }

    #[test]
    fn admin_bypasses_everything() {
        let g = groups();
        let a = Authorizer::new(&g);
        let admin = User::admin("u1", "admin");
        assert!(a.can_perform(&admin, PermissionCode::ManageGroups));
        assert!(a.can_perform(&admin, "NOT_A_CAPABILITY"));
        // group id is irrelevant for admins
        assert!(a.can_perform(&admin.clone().in_group("missing"), "VIEW_STOCK"));
    }

    #[test]
    fn group_membership_decides() {
        let g = groups();
        let a = Authorizer::new(&g);
        let bob = User::new("u2", "manager_bob").in_group("g1");
        assert!(a.can_perform(&bob, "VIEW_STOCK"));
        assert!(a.can_perform(&bob, "MANAGE_STOCK"));
        assert!(!a.can_perform(&bob, "VIEW_USERS"));
    }

    #[test]
    fn no_group_dangling_group_and_unknown_code_deny() {
        let g = groups();
        let a = Authorizer::new(&g);
        assert!(!a.can_perform(&User::new("u4", "guest"), "VIEW_STOCK"));
        assert!(!a.can_perform(&User::new("u4", "guest").in_group(""), "VIEW_STOCK"));
        assert!(!a.can_perform(&User::new("u5", "lost").in_group("g404"), "VIEW_STOCK"));
        assert!(!a.can_perform(&User::new("u2", "bob").in_group("g1"), "view_stock"));
    }

    #[test]
    fn dangling_permission_id_grants_nothing() {
        let g = groups();
        let a = Authorizer::new(&g);
        let ghost = User::new("u6", "ghost").in_group("g3");
        assert!(a.granted(&ghost).is_empty());
    }

    #[test]
    fn catalog_missing_a_code_denies_it() {
        let g = groups();
        let partial = PermissionCatalog::new(vec![Permission::new("p1", PermissionCode::ViewStock, "View")]).unwrap();
        let a = Authorizer::with_catalog(&g, &partial);
        let bob = User::new("u2", "bob").in_group("g1");
        assert!(a.can_perform(&bob, PermissionCode::ViewStock));
        assert!(!a.can_perform(&bob, PermissionCode::ManageStock));
    }

    #[test]
    fn require_and_granted() {
        let g = groups();
        let a = Authorizer::new(&g);
        let alice = User::new("u3", "auditor_alice").in_group("g2");
        assert!(a.require(&alice, PermissionCode::ViewUsers).is_ok());
        let err = a.require(&alice, PermissionCode::ManageStock).unwrap_err();
        assert!(matches!(err, StockguardError::AccessDenied { .. }));
        assert_eq!(
            a.granted(&alice),
            vec![PermissionCode::ViewStock, PermissionCode::ViewUsers, PermissionCode::ViewGroups]
        );
    }
}
