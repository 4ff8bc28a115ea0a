//! Permission catalog
//!
//! A fixed, ordered registry of capability definitions. The standard catalog is
//! built once from [`crate::constants::PERMISSIONS`] and never changes at runtime.

use std::collections::HashSet;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::constants::PERMISSIONS;
use crate::error::{Result, StockguardError};

/// Closed set of capability tags, one per domain and action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PermissionCode {
    ViewStock,
    ManageStock,
    ViewUsers,
    ManageUsers,
    ViewGroups,
    ManageGroups,
    ViewBackendCode,
}

impl PermissionCode {
    pub const ALL: [PermissionCode; 7] = [
        PermissionCode::ViewStock,
        PermissionCode::ManageStock,
        PermissionCode::ViewUsers,
        PermissionCode::ManageUsers,
        PermissionCode::ViewGroups,
        PermissionCode::ManageGroups,
        PermissionCode::ViewBackendCode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PermissionCode::ViewStock => "VIEW_STOCK",
            PermissionCode::ManageStock => "MANAGE_STOCK",
            PermissionCode::ViewUsers => "VIEW_USERS",
            PermissionCode::ManageUsers => "MANAGE_USERS",
            PermissionCode::ViewGroups => "VIEW_GROUPS",
            PermissionCode::ManageGroups => "MANAGE_GROUPS",
            PermissionCode::ViewBackendCode => "VIEW_BACKEND_CODE",
        }
    }
}

impl std::fmt::Display for PermissionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for PermissionCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::str::FromStr for PermissionCode {
    type Err = StockguardError;

    fn from_str(value: &str) -> Result<Self> {
        PermissionCode::ALL
            .into_iter()
            .find(|c| c.as_str() == value)
            .ok_or_else(|| StockguardError::UnknownPermission(value.to_string()))
    }
}

/// An immutable catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub code: PermissionCode,
    pub description: String,
}

impl Permission {
    pub fn new(id: impl Into<String>, code: PermissionCode, description: impl Into<String>) -> Self {
        Permission { id: id.into(), code, description: description.into() }
    }
}

/// Ordered, read-only registry of permissions
#[derive(Debug, Clone)]
pub struct PermissionCatalog {
    entries: Vec<Permission>,
}

static STANDARD: OnceLock<PermissionCatalog> = OnceLock::new();

impl PermissionCatalog {
    /// Build a catalog, rejecting duplicate ids or codes
    pub fn new(entries: Vec<Permission>) -> Result<Self> {
        let mut ids = HashSet::new();
        let mut codes = HashSet::new();
        for p in &entries {
            if !ids.insert(p.id.as_str()) {
                return Err(StockguardError::InvalidCatalog(format!("duplicate id '{}'", p.id)));
            }
            if !codes.insert(p.code) {
                return Err(StockguardError::InvalidCatalog(format!("duplicate code '{}'", p.code)));
            }
        }
        Ok(PermissionCatalog { entries })
    }

    /// The process-wide catalog compiled into the crate
    pub fn standard() -> &'static PermissionCatalog {
        STANDARD.get_or_init(|| PermissionCatalog {
            entries: PERMISSIONS.iter().map(|&(id, code, desc)| Permission::new(id, code, desc)).collect(),
        })
    }

    /// All entries in insertion order
    pub fn list(&self) -> &[Permission] {
        &self.entries
    }

    /// Look up by code string. Codes outside the enumeration are simply not found.
    pub fn find_by_code(&self, code: &str) -> Option<&Permission> {
        self.entries.iter().find(|p| p.code.as_str() == code)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Permission> {
        self.entries.iter().find(|p| p.id == id)
    }
}
