//! Catalog table, seed data and built-in identities

use crate::catalog::PermissionCode;

// Permission catalog: (id, code, description). Order is display order.
pub const PERMISSIONS: &[(&str, PermissionCode, &str)] = &[
    ("p1", PermissionCode::ViewStock, "View Stock Items"),
    ("p2", PermissionCode::ManageStock, "Create/Edit/Delete Stock"),
    ("p3", PermissionCode::ViewUsers, "View System Users"),
    ("p4", PermissionCode::ManageUsers, "Add/Remove Users"),
    ("p5", PermissionCode::ViewGroups, "View User Groups"),
    ("p6", PermissionCode::ManageGroups, "Manage Groups & Permissions"),
    ("p7", PermissionCode::ViewBackendCode, "View Generated Backend Code"),
];

// Built-in admin identity (protected from deletion)
pub const ADMIN_USER_ID: &str = "u1";
pub const ADMIN_USERNAME: &str = "admin";

// Seed groups: (id, name, permission ids)
pub const SEED_GROUPS: &[(&str, &str, &[&str])] = &[
    ("g1", "Stock Managers", &["p1", "p2"]),
    ("g2", "Auditors", &["p1", "p3", "p5"]),
];

// Seed users: (id, username, is_admin, group id)
pub const SEED_USERS: &[(&str, &str, bool, Option<&str>)] = &[
    (ADMIN_USER_ID, ADMIN_USERNAME, true, None),
    ("u2", "manager_bob", false, Some("g1")),
    ("u3", "auditor_alice", false, Some("g2")),
    ("u4", "guest_no_access", false, None),
];

// Role labels shown next to a user
pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_USER: &str = "User";

pub const ACCESS_DENIED: &str = "Access Denied";
