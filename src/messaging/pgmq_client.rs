//! # PostgreSQL Message Queue Client (pgmq-rs)
//!
//! Queue transport for the command lifecycle. Both queue endpoints (inbound
//! work queue, outbound orchestrator queue) live in the same pgmq instance
//! and are addressed by name.

use async_trait::async_trait;
use pgmq::PGMQueue;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{CommandCoreError, Result};

/// A received queue message, transport-neutral.
///
/// `msg_id` is the receipt handle used to acknowledge (delete) the message.
#[derive(Debug, Clone)]
pub struct QueueMessage {
    pub msg_id: i64,
    pub body: Value,
}

/// Queue operations the lifecycle engine and poller depend on.
///
/// Kept behind a trait so tests can substitute an in-memory transport.
#[async_trait]
pub trait QueueClient: Send + Sync {
    /// Create a queue if it doesn't exist.
    async fn create_queue(&self, queue_name: &str) -> Result<()>;

    /// Send a JSON message to a queue.
    async fn send_json_message(&self, queue_name: &str, message: &Value) -> Result<i64>;

    /// Receive up to `limit` messages, hiding them from other consumers for
    /// `visibility_timeout` seconds. An empty batch is normal, not an error.
    async fn read_messages(
        &self,
        queue_name: &str,
        visibility_timeout: Option<i32>,
        limit: Option<i32>,
    ) -> Result<Vec<QueueMessage>>;

    /// Acknowledge a message by deleting it from the queue.
    async fn delete_message(&self, queue_name: &str, msg_id: i64) -> Result<()>;
}

/// pgmq-rs based queue client.
#[derive(Debug, Clone)]
pub struct PgmqQueueClient {
    pgmq: PGMQueue,
}

impl PgmqQueueClient {
    /// Create a new pgmq client using a connection string.
    pub async fn new(database_url: &str) -> Result<Self> {
        let pgmq = PGMQueue::new(database_url.to_string())
            .await
            .map_err(|e| CommandCoreError::Messaging(format!("Failed to connect to pgmq: {e}")))?;

        info!("Connected to pgmq");
        Ok(Self { pgmq })
    }
}

#[async_trait]
impl QueueClient for PgmqQueueClient {
    async fn create_queue(&self, queue_name: &str) -> Result<()> {
        debug!(queue = %queue_name, "Creating queue");

        self.pgmq.create(queue_name).await.map_err(|e| {
            CommandCoreError::Messaging(format!("Failed to create queue {queue_name}: {e}"))
        })?;

        info!(queue = %queue_name, "Queue ready");
        Ok(())
    }

    async fn send_json_message(&self, queue_name: &str, message: &Value) -> Result<i64> {
        let message_id = self.pgmq.send(queue_name, message).await.map_err(|e| {
            CommandCoreError::Messaging(format!("Failed to send message to {queue_name}: {e}"))
        })?;

        debug!(queue = %queue_name, msg_id = message_id, "Message sent");
        Ok(message_id)
    }

    async fn read_messages(
        &self,
        queue_name: &str,
        visibility_timeout: Option<i32>,
        limit: Option<i32>,
    ) -> Result<Vec<QueueMessage>> {
        let messages = match limit {
            Some(l) => self
                .pgmq
                .read_batch::<Value>(queue_name, visibility_timeout, l)
                .await
                .map_err(|e| {
                    CommandCoreError::Messaging(format!(
                        "Failed to read messages from {queue_name}: {e}"
                    ))
                })?
                .unwrap_or_default(),
            None => match self
                .pgmq
                .read::<Value>(queue_name, visibility_timeout)
                .await
                .map_err(|e| {
                    CommandCoreError::Messaging(format!(
                        "Failed to read message from {queue_name}: {e}"
                    ))
                })? {
                Some(msg) => vec![msg],
                None => vec![],
            },
        };

        debug!(
            queue = %queue_name,
            message_count = messages.len(),
            "Read messages from queue"
        );

        Ok(messages
            .into_iter()
            .map(|m| QueueMessage {
                msg_id: m.msg_id,
                body: m.message,
            })
            .collect())
    }

    async fn delete_message(&self, queue_name: &str, msg_id: i64) -> Result<()> {
        self.pgmq.delete(queue_name, msg_id).await.map_err(|e| {
            CommandCoreError::Messaging(format!(
                "Failed to delete message {msg_id} from {queue_name}: {e}"
            ))
        })?;

        debug!(queue = %queue_name, msg_id = msg_id, "Message acknowledged");
        Ok(())
    }
}
