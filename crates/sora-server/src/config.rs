//! Server configuration from environment.

use anyhow::{Context, Result};
use sora_core::SoraTables;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_path: String,
    pub database_max_connections: u32,
    /// JSON reference tables replacing the built-in SORA 2.5 set
    pub tables_path: Option<String>,
    pub allow_admin_reset: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("SORA_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            database_path: env::var("SORA_DATABASE_PATH")
                .unwrap_or_else(|_| "data/sora.db".to_string()),
            database_max_connections: env::var("SORA_DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            tables_path: env::var("SORA_TABLES_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty()),
            allow_admin_reset: env::var("SORA_ALLOW_ADMIN_RESET")
                .map(|value| matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        }
    }

    /// Reference tables from `tables_path`, or the built-in set.
    pub fn load_tables(&self) -> Result<SoraTables> {
        let Some(path) = &self.tables_path else {
            return Ok(SoraTables::sora_2_5());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading reference tables from {}", path))?;
        let tables = SoraTables::from_json(&json)
            .with_context(|| format!("loading reference tables from {}", path))?;
        tracing::info!("Loaded {} reference tables from {}", tables.edition, path);
        Ok(tables)
    }
}
