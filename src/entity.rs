//! Users and groups

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::constants::{ROLE_ADMIN, ROLE_USER};

/// A named set of granted permission ids
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub permission_ids: BTreeSet<String>,
}

impl UserGroup {
    /// New groups start with no permissions
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        UserGroup { id: id.into(), name: name.into(), permission_ids: BTreeSet::new() }
    }

    pub fn with_permissions<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permission_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn grants(&self, permission_id: &str) -> bool {
        self.permission_ids.contains(permission_id)
    }

    /// Flip membership of one permission id. Returns true if it is now granted.
    pub fn toggle(&mut self, permission_id: &str) -> bool {
        if self.permission_ids.remove(permission_id) {
            false
        } else {
            self.permission_ids.insert(permission_id.to_string());
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        User { id: id.into(), username: username.into(), is_admin: false, group_id: None }
    }

    pub fn admin(id: impl Into<String>, username: impl Into<String>) -> Self {
        User { is_admin: true, ..User::new(id, username) }
    }

    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// The assigned group, treating an empty id as no group
    pub fn group(&self) -> Option<&str> {
        self.group_id.as_deref().filter(|g| !g.is_empty())
    }

    pub fn role_label(&self) -> &'static str {
        if self.is_admin { ROLE_ADMIN } else { ROLE_USER }
    }
}

/// Input for creating a user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub group_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_set() {
        let mut g = UserGroup::new("g1", "Stock Managers").with_permissions(["p1"]);
        let before = g.permission_ids.clone();
        assert!(g.toggle("p2"));
        assert!(g.grants("p2"));
        assert!(!g.toggle("p2"));
        assert_eq!(g.permission_ids, before);
    }

    #[test]
    fn toggle_removes_existing() {
        let mut g = UserGroup::new("g1", "x").with_permissions(["p1", "p2"]);
        assert!(!g.toggle("p1"));
        assert_eq!(g.permission_ids.len(), 1);
        assert!(g.toggle("p1"));
        assert_eq!(g.permission_ids.len(), 2);
    }

    #[test]
    fn empty_group_id_is_no_group() {
        assert_eq!(User::new("u4", "guest").in_group("").group(), None);
        assert_eq!(User::new("u4", "guest").group(), None);
        assert_eq!(User::new("u2", "bob").in_group("g1").group(), Some("g1"));
    }

    #[test]
    fn json_shape() {
        let u: User = serde_json::from_str(r#"{"id":"u4","username":"guest_no_access","isAdmin":false,"groupId":""}"#).unwrap();
        assert_eq!(u.group(), None);

        let g: UserGroup = serde_json::from_str(r#"{"id":"g1","name":"n","permissionIds":["p2","p1","p1"]}"#).unwrap();
        assert_eq!(g.permission_ids.len(), 2);

        let v = serde_json::to_value(User::admin("u1", "admin")).unwrap();
        assert_eq!(v["isAdmin"], true);
        assert!(v.get("groupId").is_none());
    }

    #[test]
    fn role_label() {
        assert_eq!(User::admin("u1", "admin").role_label(), "Admin");
        assert_eq!(User::new("u2", "bob").role_label(), "User");
    }
}
