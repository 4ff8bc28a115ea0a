//! Bootstrap and demo data seeding

use crate::constants::{SEED_GROUPS, SEED_USERS};
use crate::db::{Store, META_SEEDED};
use crate::entity::{User, UserGroup};
use crate::error::{Result, StockguardError};

/// Check if the store has been seeded
pub fn is_bootstrapped(store: &Store) -> Result<bool> {
    store.read(|d, tx| Ok(d.meta_value(tx, META_SEEDED)?.is_some()))
}

/// Seed the initial groups and users. Fails if already seeded.
pub fn bootstrap(store: &Store) -> Result<()> {
    store.transact(|tx| {
        if tx.meta_value(META_SEEDED)?.is_some() {
            return Err(StockguardError::AlreadyBootstrapped);
        }
        for &(id, name, perms) in SEED_GROUPS {
            tx.put_group(&UserGroup::new(id, name).with_permissions(perms.iter().copied()))?;
        }
        for &(id, username, is_admin, group) in SEED_USERS {
            tx.put_user(&User {
                id: id.to_string(),
                username: username.to_string(),
                is_admin,
                group_id: group.map(str::to_string),
            })?;
        }
        tx.set_meta(META_SEEDED, "1")
    })?;
    tracing::info!(groups = SEED_GROUPS.len(), users = SEED_USERS.len(), "store seeded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read::{GroupStore, UserStore};

    #[test]
    fn seeds_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(dir.path()).unwrap();
        assert!(!is_bootstrapped(&store).unwrap());
        bootstrap(&store).unwrap();
        assert!(is_bootstrapped(&store).unwrap());
        assert!(matches!(bootstrap(&store), Err(StockguardError::AlreadyBootstrapped)));

        assert_eq!(store.all_groups().unwrap().len(), 2);
        assert_eq!(store.all_users().unwrap().len(), 4);
        let guest = store.find_by_username("guest_no_access").unwrap().unwrap();
        assert_eq!(guest.group(), None);
        let auditors = store.group_by_id("g2").unwrap().unwrap();
        assert_eq!(auditors.permission_ids.len(), 3);
    }
}
