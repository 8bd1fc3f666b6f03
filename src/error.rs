use thiserror::Error;

/// Crate-wide error taxonomy.
///
/// Transport failures against the record store or the queues abort the
/// current transition sequence; they never escalate past one request or one
/// message's handling.
#[derive(Debug, Error)]
pub enum CommandCoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Messaging error: {0}")]
    Messaging(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<sqlx::Error> for CommandCoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CommandCoreError>;
