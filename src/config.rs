//! # Process Configuration
//!
//! Environment-driven configuration for the command service. Values are read
//! from environment variables (a `.env` file is honored when present via
//! `dotenvy` in the binary); only the database URL is required, everything
//! else has a sensible default.

use crate::error::{CommandCoreError, Result};

/// Environment variable naming the database connection string.
pub const ENV_DATABASE_URL: &str = "DATABASE_URL";

/// Top-level configuration for the command service process.
#[derive(Debug, Clone)]
pub struct CommandCoreConfig {
    /// Address the HTTP front door binds to (`host:port`)
    pub bind_address: String,
    /// PostgreSQL connection string (backs both the record store and pgmq)
    pub database_url: String,
    /// Table name for command records
    pub commands_table: String,
    /// Queue the poller reads orchestrator-initiated work from
    pub inbound_queue: String,
    /// Queue lifecycle events are published to for the downstream orchestrator
    pub orchestrator_queue: String,
}

impl CommandCoreConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var(ENV_DATABASE_URL).map_err(|_| {
            CommandCoreError::Configuration(format!("{ENV_DATABASE_URL} must be set"))
        })?;

        Ok(Self {
            bind_address: env_or("COMMAND_CORE_BIND_ADDRESS", "0.0.0.0:3000"),
            database_url,
            commands_table: env_or("COMMAND_CORE_TABLE", "commands"),
            inbound_queue: env_or("COMMAND_CORE_INBOUND_QUEUE", "command_requests"),
            orchestrator_queue: env_or("COMMAND_CORE_ORCHESTRATOR_QUEUE", "command_events"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
