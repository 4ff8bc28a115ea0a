//! Public write API - all operations require an actor with the manage capability
//!
//! Permission checks read committed state through the engine; the mutation then
//! runs in its own transaction and is committed before returning, so the next
//! evaluation observes it.

use std::collections::BTreeSet;

use tracing::info;

use crate::authz::Authorizer;
use crate::catalog::{PermissionCatalog, PermissionCode};
use crate::constants::ADMIN_USER_ID;
use crate::db::{Store, META_NEXT_GROUP, META_NEXT_USER};
use crate::entity::{NewUser, User, UserGroup};
use crate::error::{Result, StockguardError};
use crate::tx::Tx;

#[inline]
fn require(store: &Store, actor: &User, code: PermissionCode) -> Result<()> {
    Authorizer::new(store).require(actor, code)
}

fn clean_name(name: &str, what: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StockguardError::InvalidName(format!("{} is required", what)));
    }
    Ok(name.to_string())
}

fn check_permission_id(catalog: &PermissionCatalog, id: &str) -> Result<()> {
    match catalog.find_by_id(id) {
        Some(_) => Ok(()),
        None => Err(StockguardError::UnknownPermission(id.to_string())),
    }
}

fn load_group(tx: &Tx, id: &str) -> Result<UserGroup> {
    tx.group(id)?.ok_or_else(|| StockguardError::not_found("group", id))
}

fn ensure_unique_group_name(tx: &Tx, name: &str, except: Option<&str>) -> Result<()> {
    let taken = tx.all_groups()?.iter().any(|g| g.name == name && Some(g.id.as_str()) != except);
    if taken {
        return Err(StockguardError::DuplicateGroupName(name.to_string()));
    }
    Ok(())
}

// ============================================================================
// Groups
// ============================================================================

/// Create a group with an empty permission set (requires MANAGE_GROUPS)
pub fn create_group(store: &Store, actor: &User, name: &str) -> Result<UserGroup> {
    require(store, actor, PermissionCode::ManageGroups)?;
    let name = clean_name(name, "group name")?;
    let group = store.transact(|tx| {
        ensure_unique_group_name(tx, &name, None)?;
        let group = UserGroup::new(tx.next_id(META_NEXT_GROUP, "group")?, name.as_str());
        tx.put_group(&group)?;
        Ok(group)
    })?;
    info!(actor = %actor.username, group = %group.id, name = %group.name, "group created");
    Ok(group)
}

/// Rename a group (requires MANAGE_GROUPS)
pub fn rename_group(store: &Store, actor: &User, group_id: &str, name: &str) -> Result<UserGroup> {
    require(store, actor, PermissionCode::ManageGroups)?;
    let name = clean_name(name, "group name")?;
    store.transact(|tx| {
        let mut group = load_group(tx, group_id)?;
        ensure_unique_group_name(tx, &name, Some(group_id))?;
        group.name = name;
        tx.put_group(&group)?;
        Ok(group)
    })
}

/// Flip one permission on a group (requires MANAGE_GROUPS)
pub fn toggle_permission(store: &Store, actor: &User, group_id: &str, permission_id: &str) -> Result<UserGroup> {
    require(store, actor, PermissionCode::ManageGroups)?;
    check_permission_id(PermissionCatalog::standard(), permission_id)?;
    let (group, granted) = store.transact(|tx| {
        let mut group = load_group(tx, group_id)?;
        let granted = group.toggle(permission_id);
        tx.put_group(&group)?;
        Ok((group, granted))
    })?;
    info!(actor = %actor.username, group = %group_id, permission = %permission_id, granted, "permission toggled");
    Ok(group)
}

/// Replace a group's permission set (requires MANAGE_GROUPS)
pub fn set_permissions<I, S>(store: &Store, actor: &User, group_id: &str, permission_ids: I) -> Result<UserGroup>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    require(store, actor, PermissionCode::ManageGroups)?;
    let ids: BTreeSet<String> = permission_ids.into_iter().map(Into::into).collect();
    let catalog = PermissionCatalog::standard();
    for id in &ids {
        check_permission_id(catalog, id)?;
    }
    store.transact(|tx| {
        let mut group = load_group(tx, group_id)?;
        group.permission_ids = ids;
        tx.put_group(&group)?;
        Ok(group)
    })
}

/// Rename and/or replace the permission set of a group in one transaction
/// (requires MANAGE_GROUPS). Nothing is written unless every input is valid.
pub fn update_group(
    store: &Store,
    actor: &User,
    group_id: &str,
    name: Option<&str>,
    permission_ids: Option<Vec<String>>,
) -> Result<UserGroup> {
    require(store, actor, PermissionCode::ManageGroups)?;
    let name = name.map(|n| clean_name(n, "group name")).transpose()?;
    let ids = match permission_ids {
        Some(ids) => {
            let ids: BTreeSet<String> = ids.into_iter().collect();
            let catalog = PermissionCatalog::standard();
            for id in &ids {
                check_permission_id(catalog, id)?;
            }
            Some(ids)
        }
        None => None,
    };
    let group = store.transact(|tx| {
        let mut group = load_group(tx, group_id)?;
        if let Some(name) = name {
            ensure_unique_group_name(tx, &name, Some(group_id))?;
            group.name = name;
        }
        if let Some(ids) = ids {
            group.permission_ids = ids;
        }
        tx.put_group(&group)?;
        Ok(group)
    })?;
    info!(actor = %actor.username, group = %group.id, name = %group.name, "group updated");
    Ok(group)
}

/// Delete a group. Refused while any user is still assigned to it.
pub fn delete_group(store: &Store, actor: &User, group_id: &str) -> Result<bool> {
    require(store, actor, PermissionCode::ManageGroups)?;
    let deleted = store.transact(|tx| {
        let users = tx.members(group_id)?;
        if users > 0 {
            return Err(StockguardError::GroupInUse { group: group_id.to_string(), users });
        }
        tx.delete_group(group_id)
    })?;
    if deleted {
        info!(actor = %actor.username, group = %group_id, "group deleted");
    }
    Ok(deleted)
}

// ============================================================================
// Users
// ============================================================================

/// Create a user (requires MANAGE_USERS; creating an admin requires an admin actor)
pub fn create_user(store: &Store, actor: &User, new: NewUser) -> Result<User> {
    require(store, actor, PermissionCode::ManageUsers)?;
    if new.is_admin && !actor.is_admin {
        return Err(StockguardError::AccessDenied { user: actor.username.clone(), capability: "ADMIN".into() });
    }
    let username = clean_name(&new.username, "username")?;
    let group_id = new.group_id.filter(|g| !g.is_empty());
    let user = store.transact(|tx| {
        if tx.user_by_name(&username)?.is_some() {
            return Err(StockguardError::DuplicateUsername(username.clone()));
        }
        if let Some(g) = &group_id {
            load_group(tx, g)?;
        }
        let user = User {
            id: tx.next_id(META_NEXT_USER, "user")?,
            username: username.clone(),
            is_admin: new.is_admin,
            group_id: group_id.clone(),
        };
        tx.put_user(&user)?;
        Ok(user)
    })?;
    info!(actor = %actor.username, user = %user.id, username = %user.username, admin = user.is_admin, "user created");
    Ok(user)
}

/// Change or clear a user's group (requires MANAGE_USERS)
pub fn assign_group(store: &Store, actor: &User, user_id: &str, group_id: Option<&str>) -> Result<User> {
    require(store, actor, PermissionCode::ManageUsers)?;
    let group_id = group_id.filter(|g| !g.is_empty());
    let user = store.transact(|tx| {
        let mut user = tx.user(user_id)?.ok_or_else(|| StockguardError::not_found("user", user_id))?;
        if let Some(g) = group_id {
            load_group(tx, g)?;
        }
        user.group_id = group_id.map(str::to_string);
        tx.put_user(&user)?;
        Ok(user)
    })?;
    info!(actor = %actor.username, user = %user_id, group = ?group_id, "group assignment changed");
    Ok(user)
}

/// Delete a user (requires MANAGE_USERS). The built-in admin cannot be deleted.
pub fn delete_user(store: &Store, actor: &User, user_id: &str) -> Result<bool> {
    require(store, actor, PermissionCode::ManageUsers)?;
    let deleted = store.transact(|tx| {
        match tx.user(user_id)? {
            Some(u) if u.id == ADMIN_USER_ID => Err(StockguardError::ProtectedUser(u.username)),
            Some(_) => tx.delete_user(user_id),
            None => Ok(false),
        }
    })?;
    if deleted {
        info!(actor = %actor.username, user = %user_id, "user deleted");
    }
    Ok(deleted)
}
