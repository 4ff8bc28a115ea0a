//! LMDB-backed store for groups and users
//!
//! The store is an explicit handle owned by the caller. Opening it creates the
//! environment and named databases; cloning it shares the same environment.

use std::path::Path;

use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions, RoTxn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::entity::{User, UserGroup};
use crate::error::Result;

pub type DbJson = Database<Str, Bytes>;
pub type DbStr = Database<Str, Str>;

// Meta keys
pub(crate) const META_SEEDED: &str = "seeded";
pub(crate) const META_NEXT_GROUP: &str = "next_group";
pub(crate) const META_NEXT_USER: &str = "next_user";

/// All database handles
#[derive(Clone, Copy)]
pub struct Dbs {
    /// group id -> JSON group
    pub groups: DbJson,
    /// user id -> JSON user
    pub users: DbJson,
    /// username -> user id
    pub usernames: DbStr,
    pub meta: DbStr,
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    Ok(serde_json::from_slice(bytes)?)
}

impl Dbs {
    pub fn group(&self, tx: &RoTxn, id: &str) -> Result<Option<UserGroup>> {
        self.groups.get(tx, id)?.map(decode).transpose()
    }

    pub fn all_groups(&self, tx: &RoTxn) -> Result<Vec<UserGroup>> {
        let mut r = Vec::new();
        for item in self.groups.iter(tx)? {
            let (_, v) = item?;
            r.push(decode(v)?);
        }
        Ok(r)
    }

    pub fn user(&self, tx: &RoTxn, id: &str) -> Result<Option<User>> {
        self.users.get(tx, id)?.map(decode).transpose()
    }

    pub fn all_users(&self, tx: &RoTxn) -> Result<Vec<User>> {
        let mut r = Vec::new();
        for item in self.users.iter(tx)? {
            let (_, v) = item?;
            r.push(decode(v)?);
        }
        Ok(r)
    }

    pub fn user_by_name(&self, tx: &RoTxn, username: &str) -> Result<Option<User>> {
        match self.usernames.get(tx, username)? {
            Some(id) => self.user(tx, id),
            None => Ok(None),
        }
    }

    /// Count users whose group assignment points at `group_id`
    pub fn members(&self, tx: &RoTxn, group_id: &str) -> Result<usize> {
        Ok(self.all_users(tx)?.iter().filter(|u| u.group() == Some(group_id)).count())
    }

    pub fn meta_value(&self, tx: &RoTxn, key: &str) -> Result<Option<String>> {
        Ok(self.meta.get(tx, key)?.map(str::to_string))
    }
}

/// Handle to an opened store
#[derive(Clone)]
pub struct Store {
    env: Env,
    dbs: Dbs,
}

impl Store {
    /// Open (or create) the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::create_dir_all(path)?;
        // SAFETY: LMDB requires no other processes access this path concurrently during open.
        let env = unsafe { EnvOpenOptions::new().map_size(1 << 30).max_dbs(4).open(path)? };
        let mut tx = env.write_txn()?;
        let dbs = Dbs {
            groups: env.create_database(&mut tx, Some("groups"))?,
            users: env.create_database(&mut tx, Some("users"))?,
            usernames: env.create_database(&mut tx, Some("usernames"))?,
            meta: env.create_database(&mut tx, Some("meta"))?,
        };
        tx.commit()?;
        tracing::debug!(path = %path.display(), "store opened");
        Ok(Store { env, dbs })
    }

    pub(crate) fn env(&self) -> &Env {
        &self.env
    }

    pub(crate) fn dbs(&self) -> &Dbs {
        &self.dbs
    }

    /// Execute a read-only operation against a fresh snapshot
    pub fn read<T, F: FnOnce(&Dbs, &RoTxn) -> Result<T>>(&self, f: F) -> Result<T> {
        let tx = self.env.read_txn()?;
        f(&self.dbs, &tx)
    }
}
