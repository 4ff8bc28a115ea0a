//! StockGuard - role-based access control for an inventory app
//!
//! A static permission catalog, user groups granting catalog permissions, and a
//! fail-closed engine deciding whether a user may perform an action or view a
//! screen. Groups and users live in an LMDB store owned by the caller.

pub mod authz;
pub mod bootstrap;
pub mod catalog;
pub mod constants;
pub mod db;
pub mod entity;
pub mod error;
pub mod read;
pub mod surface;
pub mod tx;
pub mod write;

#[cfg(feature = "server")]
pub mod config;
#[cfg(feature = "server")]
pub mod server;

pub use authz::{can_perform, Authorizer};
pub use bootstrap::{bootstrap, is_bootstrapped};
pub use catalog::{Permission, PermissionCatalog, PermissionCode};
pub use db::Store;
pub use entity::{NewUser, User, UserGroup};
pub use error::{Result, StockguardError};
pub use read::{GroupStore, UserStore};
pub use surface::{Entry, NavEntry, Operation, Screen};
pub use tx::Tx;
