//! # Command Model
//!
//! The command (work order) record and its durable store.
//!
//! A command record exists in the store if and only if it has been created
//! and not yet deleted. The `DELETED` status is terminal and only ever
//! appears on outbound events; deleted records are removed, never tagged.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use std::fmt;
use uuid::Uuid;

use crate::error::{CommandCoreError, Result};

/// Lifecycle status of a command.
///
/// `IN_PROCESS` is the initial status set at creation; `VALIDATED` and
/// `CANCELED` are reached through queue-triggered transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandStatus {
    /// Initial status when a command is created
    InProcess,
    /// Command accepted by the orchestrator
    Validated,
    /// Command rejected by the orchestrator
    Canceled,
    /// Terminal; carried on outbound events only, the record is removed
    Deleted,
}

impl CommandStatus {
    /// Check if this is a terminal status (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Deleted)
    }
}

impl fmt::Display for CommandStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProcess => write!(f, "IN_PROCESS"),
            Self::Validated => write!(f, "VALIDATED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Deleted => write!(f, "DELETED"),
        }
    }
}

impl std::str::FromStr for CommandStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "IN_PROCESS" => Ok(Self::InProcess),
            "VALIDATED" => Ok(Self::Validated),
            "CANCELED" => Ok(Self::Canceled),
            "DELETED" => Ok(Self::Deleted),
            _ => Err(format!("Invalid command status: {s}")),
        }
    }
}

/// A tracked work order.
///
/// `id`, `date`, and `items` are immutable after creation; only `status`
/// changes through the lifecycle. `items` is an opaque payload supplied by
/// the creator and is never reinterpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub id: Uuid,
    pub date: DateTime<Utc>,
    pub items: serde_json::Value,
    pub status: CommandStatus,
}

impl Command {
    /// Build a new command in its initial state.
    pub fn new(items: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            date: Utc::now(),
            items,
            status: CommandStatus::InProcess,
        }
    }
}

/// Durable storage for command records, keyed by command id.
///
/// The lifecycle engine is the sole owner of this store; no other component
/// mutates it.
#[async_trait]
pub trait CommandStore: Send + Sync {
    /// Insert or overwrite a record.
    async fn put(&self, command: &Command) -> Result<()>;

    /// Conditionally set the status of an existing record.
    ///
    /// Returns `false` when no record with that id exists (absent or
    /// concurrently deleted); that is a no-op, not an error.
    async fn update_status(&self, id: Uuid, status: CommandStatus) -> Result<bool>;

    /// Delete a record by id. Deleting a nonexistent id is a no-op.
    async fn delete(&self, id: Uuid) -> Result<()>;

    /// Scan all records.
    async fn scan(&self) -> Result<Vec<Command>>;
}

/// Row shape for the commands table; `status` is stored as TEXT.
#[derive(Debug, FromRow)]
struct CommandRow {
    id: Uuid,
    date: DateTime<Utc>,
    items: serde_json::Value,
    status: String,
}

impl TryFrom<CommandRow> for Command {
    type Error = CommandCoreError;

    fn try_from(row: CommandRow) -> Result<Command> {
        let status = row
            .status
            .parse()
            .map_err(CommandCoreError::Database)?;
        Ok(Command {
            id: row.id,
            date: row.date,
            items: row.items,
            status,
        })
    }
}

/// PostgreSQL-backed command store.
#[derive(Debug, Clone)]
pub struct PgCommandStore {
    pool: PgPool,
    table: String,
}

impl PgCommandStore {
    pub fn new(pool: PgPool, table: String) -> Self {
        Self { pool, table }
    }

    /// Create the commands table if it does not exist yet.
    ///
    /// Idempotent; called once at process startup.
    pub async fn ensure_schema(&self) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                date TIMESTAMPTZ NOT NULL,
                items JSONB NOT NULL,
                status TEXT NOT NULL
            )
            "#,
            self.table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        tracing::debug!(table = %self.table, "Commands table ready");
        Ok(())
    }
}

#[async_trait]
impl CommandStore for PgCommandStore {
    async fn put(&self, command: &Command) -> Result<()> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, date, items, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET date = EXCLUDED.date, items = EXCLUDED.items, status = EXCLUDED.status
            "#,
            self.table
        );
        sqlx::query(&sql)
            .bind(command.id)
            .bind(command.date)
            .bind(&command.items)
            .bind(command.status.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: CommandStatus) -> Result<bool> {
        let sql = format!("UPDATE {} SET status = $2 WHERE id = $1", self.table);
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(status.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let sql = format!("DELETE FROM {} WHERE id = $1", self.table);
        sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Command>> {
        let sql = format!(
            "SELECT id, date, items, status FROM {} ORDER BY date",
            self.table
        );
        let rows = sqlx::query_as::<_, CommandRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Command::try_from).collect()
    }
}
