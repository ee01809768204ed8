//! Configuration loader for the `humidash` backend service.
//!
//! Centralizes runtime configuration and its defaults, loading from
//! environment variables (with optional `.env` support provided by the
//! caller). Keeping every `env::var` call here means the rest of the crate
//! receives one immutable snapshot, including the resolved schema mapping.

use std::env;

use anyhow::{anyhow, Result};

use crate::schema::{SchemaLayout, SchemaMapping};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent
/// configuration snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Address the HTTP server binds to.
    pub bind_addr: String,

    /// Which table layout the target database uses.
    pub layout: SchemaLayout,

    /// Logical-field to physical-column mapping resolved from `layout`.
    pub schema: SchemaMapping,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `BIND_ADDR` – server bind address (default: `0.0.0.0:8080`)
/// - `SCHEMA_LAYOUT` – `inline` or `city` (default: `inline`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

    let layout = match env::var("SCHEMA_LAYOUT") {
        Ok(raw) => raw
            .parse::<SchemaLayout>()
            .map_err(|e| anyhow!("Invalid SCHEMA_LAYOUT: {}", e))?,
        Err(_) => SchemaLayout::Inline,
    };

    Ok(Config {
        db_url,
        db_pool_max,
        bind_addr,
        layout,
        schema: SchemaMapping::for_layout(layout),
    })
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    ///
    /// Masks the database password while showing everything else.
    pub fn log_config(&self) {
        // ---
        let masked_db_url = if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                )
            } else {
                self.db_url.clone()
            }
        } else {
            self.db_url.clone()
        };

        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL  : {}", masked_db_url);
        tracing::info!("  DB_POOL_MAX   : {}", self.db_pool_max);
        tracing::info!("  BIND_ADDR     : {}", self.bind_addr);
        tracing::info!("  SCHEMA_LAYOUT : {}", self.layout);
        tracing::info!("  readings table: {}", self.schema.readings_table);
    }
}
