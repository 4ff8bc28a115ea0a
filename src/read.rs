//! Read contracts for groups and users
//!
//! The engine only ever borrows read access. `Store` answers from a fresh LMDB
//! snapshot per call; slices and vectors serve as in-memory stores.

use crate::db::Store;
use crate::entity::{User, UserGroup};
use crate::error::Result;

/// Read view over user groups
pub trait GroupStore {
    fn all_groups(&self) -> Result<Vec<UserGroup>>;
    fn group_by_id(&self, id: &str) -> Result<Option<UserGroup>>;
}

/// Read view over users
pub trait UserStore {
    fn all_users(&self) -> Result<Vec<User>>;
    fn user_by_id(&self, id: &str) -> Result<Option<User>>;
    fn find_by_username(&self, username: &str) -> Result<Option<User>>;
}

impl GroupStore for Store {
    fn all_groups(&self) -> Result<Vec<UserGroup>> {
        self.read(|d, tx| d.all_groups(tx))
    }

    fn group_by_id(&self, id: &str) -> Result<Option<UserGroup>> {
        self.read(|d, tx| d.group(tx, id))
    }
}

impl UserStore for Store {
    fn all_users(&self) -> Result<Vec<User>> {
        self.read(|d, tx| d.all_users(tx))
    }

    fn user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.read(|d, tx| d.user(tx, id))
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.read(|d, tx| d.user_by_name(tx, username))
    }
}

impl GroupStore for [UserGroup] {
    fn all_groups(&self) -> Result<Vec<UserGroup>> {
        Ok(self.to_vec())
    }

    fn group_by_id(&self, id: &str) -> Result<Option<UserGroup>> {
        Ok(self.iter().find(|g| g.id == id).cloned())
    }
}

impl GroupStore for Vec<UserGroup> {
    fn all_groups(&self) -> Result<Vec<UserGroup>> {
        self.as_slice().all_groups()
    }

    fn group_by_id(&self, id: &str) -> Result<Option<UserGroup>> {
        self.as_slice().group_by_id(id)
    }
}

impl UserStore for [User] {
    fn all_users(&self) -> Result<Vec<User>> {
        Ok(self.to_vec())
    }

    fn user_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.iter().find(|u| u.id == id).cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.iter().find(|u| u.username == username).cloned())
    }
}

impl UserStore for Vec<User> {
    fn all_users(&self) -> Result<Vec<User>> {
        self.as_slice().all_users()
    }

    fn user_by_id(&self, id: &str) -> Result<Option<User>> {
        self.as_slice().user_by_id(id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.as_slice().find_by_username(username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_group_store() {
        let groups = vec![UserGroup::new("g1", "a"), UserGroup::new("g2", "b")];
        assert_eq!(groups.all_groups().unwrap().len(), 2);
        assert_eq!(groups.group_by_id("g2").unwrap().map(|g| g.name), Some("b".to_string()));
        assert!(groups.group_by_id("g3").unwrap().is_none());
    }

    #[test]
    fn slice_user_store() {
        let users = vec![User::admin("u1", "admin"), User::new("u2", "manager_bob")];
        assert_eq!(users.find_by_username("manager_bob").unwrap().map(|u| u.id), Some("u2".to_string()));
        assert!(users.user_by_id("u1").unwrap().unwrap().is_admin);
        assert!(users.find_by_username("nobody").unwrap().is_none());
    }

    #[test]
    fn store_reads() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        store
            .transact(|tx| {
                tx.put_group(&UserGroup::new("g1", "Stock Managers"))?;
                tx.put_user(&User::new("u2", "manager_bob").in_group("g1"))
            })
            .unwrap();
        assert_eq!(store.all_groups().unwrap().len(), 1);
        assert!(store.group_by_id("g1").unwrap().is_some());
        assert_eq!(store.all_users().unwrap().len(), 1);
        assert_eq!(store.find_by_username("manager_bob").unwrap().unwrap().id, "u2");
        assert!(store.user_by_id("u3").unwrap().is_none());
    }
}
