//! Server configuration sourced from environment variables

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Result, StockguardError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: PathBuf,
    pub bind_addr: SocketAddr,
    /// Seed demo data into an empty store on startup
    pub seed: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup (environment, test fixtures)
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Result<Self> {
        let db_path = get("STOCKGUARD_DB").unwrap_or_else(|| "./data/stockguard.mdb".into()).into();
        let bind = match get("STOCKGUARD_BIND") {
            Some(b) => b,
            None => format!("0.0.0.0:{}", get("PORT").unwrap_or_else(|| "8080".into())),
        };
        let bind_addr = bind
            .parse()
            .map_err(|e| StockguardError::Config(format!("invalid bind address '{}': {}", bind, e)))?;
        let seed = match get("STOCKGUARD_SEED").as_deref() {
            None | Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(other) => return Err(StockguardError::Config(format!("invalid STOCKGUARD_SEED '{}'", other))),
        };
        Ok(ServerConfig { db_path, bind_addr, seed })
    }
}
