//! Error types for StockGuard

use thiserror::Error;

/// The main error type for StockGuard operations
#[derive(Debug, Error)]
pub enum StockguardError {
    #[error("storage error: {0}")]
    Storage(#[from] heed::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The acting user lacks the capability an operation declares
    #[error("{user} lacks {capability}")]
    AccessDenied { user: String, capability: String },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("unknown permission '{0}'")]
    UnknownPermission(String),

    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("username '{0}' already exists")]
    DuplicateUsername(String),

    #[error("group name '{0}' already exists")]
    DuplicateGroupName(String),

    /// Groups cannot be deleted while users still reference them
    #[error("group '{group}' is still assigned to {users} user(s)")]
    GroupInUse { group: String, users: usize },

    #[error("user '{0}' is protected and cannot be deleted")]
    ProtectedUser(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("already bootstrapped")]
    AlreadyBootstrapped,

    #[error("configuration error: {0}")]
    Config(String),
}

impl StockguardError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        StockguardError::NotFound { kind, id: id.into() }
    }
}

/// Result type alias for StockGuard operations
pub type Result<T> = std::result::Result<T, StockguardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            StockguardError::AccessDenied { user: "manager_bob".into(), capability: "MANAGE_USERS".into() },
            StockguardError::not_found("group", "g9"),
            StockguardError::UnknownPermission("p99".into()),
            StockguardError::GroupInUse { group: "g1".into(), users: 2 },
            StockguardError::ProtectedUser("admin".into()),
            StockguardError::AlreadyBootstrapped,
        ];
        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }

    #[test]
    fn access_denied_names_user_and_capability() {
        let e = StockguardError::AccessDenied { user: "auditor_alice".into(), capability: "MANAGE_STOCK".into() };
        assert_eq!(e.to_string(), "auditor_alice lacks MANAGE_STOCK");
    }
}
