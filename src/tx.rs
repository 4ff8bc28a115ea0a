//! Transaction wrapper for batched writes
//!
//! `Tx` performs raw mutations with no permission checks. The actor-gated API in
//! [`crate::write`] is the public way to mutate a store.

use heed::RwTxn;

use crate::db::{encode, Dbs, Store};
use crate::entity::{User, UserGroup};
use crate::error::{Result, StockguardError};

/// Transaction wrapper for batched writes
pub struct Tx<'s> {
    txn: RwTxn<'s>,
    dbs: &'s Dbs,
}

impl<'s> Tx<'s> {
    pub fn group(&self, id: &str) -> Result<Option<UserGroup>> {
        self.dbs.group(&self.txn, id)
    }

    pub fn all_groups(&self) -> Result<Vec<UserGroup>> {
        self.dbs.all_groups(&self.txn)
    }

    pub fn user(&self, id: &str) -> Result<Option<User>> {
        self.dbs.user(&self.txn, id)
    }

    pub fn user_by_name(&self, username: &str) -> Result<Option<User>> {
        self.dbs.user_by_name(&self.txn, username)
    }

    pub fn members(&self, group_id: &str) -> Result<usize> {
        self.dbs.members(&self.txn, group_id)
    }

    pub fn meta_value(&self, key: &str) -> Result<Option<String>> {
        self.dbs.meta_value(&self.txn, key)
    }

    pub fn set_meta(&mut self, key: &str, value: &str) -> Result<()> {
        Ok(self.dbs.meta.put(&mut self.txn, key, value)?)
    }

    /// Insert or replace a group
    pub fn put_group(&mut self, group: &UserGroup) -> Result<()> {
        Ok(self.dbs.groups.put(&mut self.txn, &group.id, &encode(group)?)?)
    }

    pub fn delete_group(&mut self, id: &str) -> Result<bool> {
        Ok(self.dbs.groups.delete(&mut self.txn, id)?)
    }

    /// Insert or replace a user, keeping the username index in sync
    pub fn put_user(&mut self, user: &User) -> Result<()> {
        if let Some(existing) = self.dbs.usernames.get(&self.txn, &user.username)? {
            if existing != user.id {
                return Err(StockguardError::DuplicateUsername(user.username.clone()));
            }
        }
        let old = self.user(&user.id)?;
        if let Some(old) = old.filter(|o| o.username != user.username) {
            self.dbs.usernames.delete(&mut self.txn, &old.username)?;
        }
        self.dbs.users.put(&mut self.txn, &user.id, &encode(user)?)?;
        self.dbs.usernames.put(&mut self.txn, &user.username, &user.id)?;
        Ok(())
    }

    pub fn delete_user(&mut self, id: &str) -> Result<bool> {
        match self.user(id)? {
            Some(user) => {
                self.dbs.usernames.delete(&mut self.txn, &user.username)?;
                Ok(self.dbs.users.delete(&mut self.txn, id)?)
            }
            None => Ok(false),
        }
    }

    /// Allocate the next id from a meta counter, e.g. `group-3`
    pub(crate) fn next_id(&mut self, counter: &str, prefix: &str) -> Result<String> {
        let n = self.meta_value(counter)?.and_then(|s| s.parse::<u64>().ok()).unwrap_or(1);
        self.set_meta(counter, &(n + 1).to_string())?;
        Ok(format!("{}-{}", prefix, n))
    }
}

impl Store {
    /// Run multiple operations in a single transaction
    pub fn transact<T, F: FnOnce(&mut Tx) -> Result<T>>(&self, f: F) -> Result<T> {
        let mut tx = Tx { txn: self.env().write_txn()?, dbs: self.dbs() };
        let r = f(&mut tx)?;
        tx.txn.commit()?;
        Ok(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::META_NEXT_GROUP;

    fn store() -> (tempfile::TempDir, Store) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn put_and_read_back() {
        let (_d, s) = store();
        s.transact(|tx| {
            tx.put_group(&UserGroup::new("g1", "Stock Managers").with_permissions(["p1"]))?;
            tx.put_user(&User::new("u2", "manager_bob").in_group("g1"))
        })
        .unwrap();

        let g = s.read(|d, tx| d.group(tx, "g1")).unwrap().unwrap();
        assert!(g.grants("p1"));
        let u = s.read(|d, tx| d.user_by_name(tx, "manager_bob")).unwrap().unwrap();
        assert_eq!(u.id, "u2");
        assert_eq!(s.read(|d, tx| d.members(tx, "g1")).unwrap(), 1);
    }

    #[test]
    fn username_index_follows_renames_and_deletes() {
        let (_d, s) = store();
        s.transact(|tx| tx.put_user(&User::new("u9", "old"))).unwrap();
        s.transact(|tx| tx.put_user(&User::new("u9", "new"))).unwrap();
        assert!(s.read(|d, tx| d.user_by_name(tx, "old")).unwrap().is_none());
        assert!(s.read(|d, tx| d.user_by_name(tx, "new")).unwrap().is_some());

        assert!(s.transact(|tx| tx.delete_user("u9")).unwrap());
        assert!(!s.transact(|tx| tx.delete_user("u9")).unwrap());
        assert!(s.read(|d, tx| d.user_by_name(tx, "new")).unwrap().is_none());
    }

    #[test]
    fn duplicate_username_rejected() {
        let (_d, s) = store();
        s.transact(|tx| tx.put_user(&User::new("u1", "admin"))).unwrap();
        let r = s.transact(|tx| tx.put_user(&User::new("u2", "admin")));
        assert!(matches!(r, Err(StockguardError::DuplicateUsername(_))));
    }

    #[test]
    fn failed_transaction_is_not_committed() {
        let (_d, s) = store();
        let r: Result<()> = s.transact(|tx| {
            tx.put_group(&UserGroup::new("g1", "x"))?;
            Err(StockguardError::AlreadyBootstrapped)
        });
        assert!(r.is_err());
        assert!(s.read(|d, tx| d.group(tx, "g1")).unwrap().is_none());
    }

    #[test]
    fn next_id_increments() {
        let (_d, s) = store();
        let a = s.transact(|tx| tx.next_id(META_NEXT_GROUP, "group")).unwrap();
        let b = s.transact(|tx| tx.next_id(META_NEXT_GROUP, "group")).unwrap();
        assert_eq!(a, "group-1");
        assert_eq!(b, "group-2");
    }
}
