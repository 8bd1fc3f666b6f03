//! # Inbound Queue Poller
//!
//! Fixed-interval loop that surfaces orchestrator-initiated work to the
//! lifecycle engine. Each tick reads one batch from the inbound queue,
//! dispatches every message by its action, and acknowledges only the
//! messages whose full transition sequence succeeded. Unacknowledged
//! messages become visible again after the visibility timeout and are
//! retried by a later tick (at-least-once delivery).

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{CommandCoreError, Result};
use crate::lifecycle::LifecycleEngine;
use crate::messaging::{CommandKey, InboundAction, InboundMessage, QueueClient};
use crate::models::Command;

/// Tuning for the inbound queue poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Seconds between poll ticks
    pub poll_interval_seconds: u64,
    /// Maximum messages fetched per tick
    pub batch_size: i32,
    /// Seconds a fetched message stays hidden from other consumers; must
    /// cover the expected processing time of one batch
    pub visibility_timeout_seconds: i32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: 10,
            batch_size: 10,
            visibility_timeout_seconds: 60,
        }
    }
}

/// Polls the inbound work queue and dispatches messages to the engine.
pub struct CommandPoller {
    engine: Arc<LifecycleEngine>,
    queue: Arc<dyn QueueClient>,
    inbound_queue: String,
    config: PollerConfig,
}

impl CommandPoller {
    pub fn new(
        engine: Arc<LifecycleEngine>,
        queue: Arc<dyn QueueClient>,
        inbound_queue: String,
        config: PollerConfig,
    ) -> Self {
        Self {
            engine,
            queue,
            inbound_queue,
            config,
        }
    }

    /// Run the polling loop forever.
    ///
    /// A failed receive is logged and retried on the next tick rather than
    /// aborting the process; the queue itself is the only retry mechanism
    /// for individual messages.
    #[instrument(skip(self))]
    pub async fn start(&self) {
        info!(
            queue = %self.inbound_queue,
            poll_interval = self.config.poll_interval_seconds,
            batch_size = self.config.batch_size,
            "Starting inbound queue poller"
        );

        loop {
            if let Err(e) = self.poll_batch().await {
                error!(error = %e, "Inbound queue receive failed; retrying next tick");
            }
            sleep(Duration::from_secs(self.config.poll_interval_seconds)).await;
        }
    }

    /// Read and dispatch one batch; returns how many messages were
    /// acknowledged.
    ///
    /// An empty batch is normal under long-poll semantics, not an error.
    /// Failure of one message's handling never affects the others in the
    /// batch.
    pub async fn poll_batch(&self) -> Result<usize> {
        let messages = self
            .queue
            .read_messages(
                &self.inbound_queue,
                Some(self.config.visibility_timeout_seconds),
                Some(self.config.batch_size),
            )
            .await?;

        if messages.is_empty() {
            return Ok(0);
        }

        debug!(
            message_count = messages.len(),
            queue = %self.inbound_queue,
            "Processing inbound batch"
        );

        let mut processed = 0;
        for message in messages {
            match self.dispatch(&message.body).await {
                Ok(()) => {
                    // Acknowledge strictly after the store write and the
                    // event publish both completed.
                    if let Err(e) = self
                        .queue
                        .delete_message(&self.inbound_queue, message.msg_id)
                        .await
                    {
                        warn!(
                            msg_id = message.msg_id,
                            error = %e,
                            "Failed to acknowledge processed message; it will be redelivered"
                        );
                    } else {
                        processed += 1;
                    }
                }
                Err(e) => {
                    warn!(
                        msg_id = message.msg_id,
                        error = %e,
                        "Message left unacknowledged for redelivery"
                    );
                }
            }
        }

        if processed > 0 {
            info!(
                processed = processed,
                queue = %self.inbound_queue,
                "Completed inbound batch"
            );
        }

        Ok(processed)
    }

    /// Parse one message body and run the matching engine transition.
    ///
    /// Bodies that don't parse (unknown action, malformed command) produce
    /// no store mutation and no event; the error keeps the message
    /// unacknowledged.
    async fn dispatch(&self, body: &Value) -> Result<()> {
        let inbound: InboundMessage = serde_json::from_value(body.clone())
            .map_err(|e| CommandCoreError::Validation(format!("Invalid inbound message: {e}")))?;

        match inbound.action {
            InboundAction::Create => {
                let command = parse_command(inbound.command)?;
                self.engine.confirm_create(command).await
            }
            InboundAction::Validate => {
                let command = parse_command(inbound.command)?;
                self.engine.validate_command(command).await
            }
            InboundAction::Cancel => {
                let command = parse_command(inbound.command)?;
                self.engine.cancel_command(command).await
            }
            InboundAction::Delete => {
                // Delete bodies may be partial; only the id is required.
                let key: CommandKey = serde_json::from_value(inbound.command.clone()).map_err(
                    |e| CommandCoreError::Validation(format!("Invalid delete message: {e}")),
                )?;
                self.engine.confirm_delete(key.id, inbound.command).await
            }
        }
    }
}

fn parse_command(value: Value) -> Result<Command> {
    serde_json::from_value(value)
        .map_err(|e| CommandCoreError::Validation(format!("Invalid command payload: {e}")))
}
