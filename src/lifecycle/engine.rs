//! # Command Lifecycle Engine
//!
//! Enforces the command state machine and the store-write-then-publish
//! ordering for every transition, regardless of which entry point triggered
//! it.
//!
//! Each transition is an ordered pipeline of fallible steps: the record
//! store mutation must complete (including the store's own acknowledgment)
//! before the event publish begins, and a failed step aborts the rest of
//! the sequence. For queue-triggered transitions the caller (the poller)
//! acknowledges the inbound message only after the whole sequence
//! succeeded.
//!
//! There is no compensating rollback: when the store mutation lands but the
//! publish fails, the store stays mutated with no corresponding event. That
//! gap is inherited from the design and logged distinctly so operators can
//! reconcile.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::{CommandCoreError, Result};
use crate::messaging::{CommandEvent, EventAction, QueueClient};
use crate::models::{Command, CommandStatus, CommandStore};

/// The command lifecycle state machine.
///
/// Holds the injected store and queue handles; owns all mutations of the
/// record store.
pub struct LifecycleEngine {
    store: Arc<dyn CommandStore>,
    queue: Arc<dyn QueueClient>,
    orchestrator_queue: String,
}

impl LifecycleEngine {
    pub fn new(
        store: Arc<dyn CommandStore>,
        queue: Arc<dyn QueueClient>,
        orchestrator_queue: String,
    ) -> Self {
        Self {
            store,
            queue,
            orchestrator_queue,
        }
    }

    // HTTP-triggered transitions -------------------------------------------

    /// Create a new command from an opaque items payload.
    ///
    /// Inserts the record with status `IN_PROCESS`, then publishes a
    /// `CREATE` event.
    #[instrument(skip(self, items))]
    pub async fn create_command(&self, items: Value) -> Result<Command> {
        let command = Command::new(items);

        self.store.put(&command).await?;
        self.publish(CommandEvent::for_command(EventAction::Create, &command)?)
            .await?;

        info!(command_id = %command.id, "Command created");
        Ok(command)
    }

    /// Delete a command by id.
    ///
    /// Idempotent: deleting a nonexistent id succeeds and still publishes
    /// the `DELETED` event.
    #[instrument(skip(self))]
    pub async fn delete_command(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await?;
        self.publish(CommandEvent::new(
            EventAction::Deleted,
            id,
            serde_json::json!({ "id": id, "status": CommandStatus::Deleted }),
        ))
        .await?;

        info!(command_id = %id, "Command deleted");
        Ok(())
    }

    /// List all command records. Publishes nothing.
    pub async fn list_commands(&self) -> Result<Vec<Command>> {
        self.store.scan().await
    }

    // Queue-triggered transitions ------------------------------------------

    /// Re-assert a command from an orchestrator `CREATE` message.
    ///
    /// Overwrites the record as carried in the message body, then publishes
    /// `CREATED`.
    #[instrument(skip(self, command), fields(command_id = %command.id))]
    pub async fn confirm_create(&self, command: Command) -> Result<()> {
        self.store.put(&command).await?;
        self.publish(CommandEvent::for_command(EventAction::Created, &command)?)
            .await?;

        info!(command_id = %command.id, "Command creation confirmed");
        Ok(())
    }

    /// Mark a command `VALIDATED` from an orchestrator `VALIDATE` message.
    #[instrument(skip(self, command), fields(command_id = %command.id))]
    pub async fn validate_command(&self, command: Command) -> Result<()> {
        self.transition_status(command, CommandStatus::Validated, EventAction::Validated)
            .await
    }

    /// Mark a command `CANCELED` from an orchestrator `CANCEL` message.
    #[instrument(skip(self, command), fields(command_id = %command.id))]
    pub async fn cancel_command(&self, command: Command) -> Result<()> {
        self.transition_status(command, CommandStatus::Canceled, EventAction::Canceled)
            .await
    }

    /// Delete a command from an orchestrator `DELETE` message.
    ///
    /// `body` is republished as the event payload as received.
    #[instrument(skip(self, body))]
    pub async fn confirm_delete(&self, id: Uuid, body: Value) -> Result<()> {
        self.store.delete(id).await?;
        self.publish(CommandEvent::new(EventAction::Deleted, id, body))
            .await?;

        info!(command_id = %id, "Command deletion confirmed");
        Ok(())
    }

    // Shared transition steps ----------------------------------------------

    /// Conditional status update followed by the matching event.
    ///
    /// A zero-row update (record absent or deleted by a racing transition)
    /// is a no-op, not an error, and does not block the publish; that keeps
    /// the transition idempotent under at-least-once redelivery.
    async fn transition_status(
        &self,
        mut command: Command,
        status: CommandStatus,
        action: EventAction,
    ) -> Result<()> {
        let matched = self.store.update_status(command.id, status).await?;
        if !matched {
            debug!(
                command_id = %command.id,
                status = %status,
                "Status update matched no record; continuing as no-op"
            );
        }

        command.status = status;
        self.publish(CommandEvent::for_command(action, &command)?)
            .await?;

        info!(command_id = %command.id, status = %status, "Command transitioned");
        Ok(())
    }

    /// Publish a lifecycle event to the orchestrator queue.
    ///
    /// Runs strictly after the store mutation of the current transition. A
    /// failure here leaves the store mutated with no corresponding event;
    /// that partial-sequence state is logged distinctly before the error
    /// propagates.
    async fn publish(&self, event: CommandEvent) -> Result<()> {
        let action = event.action;
        let group_id = event.group_id.clone();
        let payload = serde_json::to_value(&event)
            .map_err(|e| CommandCoreError::Validation(format!("Unserializable event: {e}")))?;

        match self
            .queue
            .send_json_message(&self.orchestrator_queue, &payload)
            .await
        {
            Ok(msg_id) => {
                debug!(
                    action = %action,
                    group_id = %group_id,
                    msg_id = msg_id,
                    "Published lifecycle event"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    action = %action,
                    group_id = %group_id,
                    error = %e,
                    "Store mutation committed but event publish failed; orchestrator was not notified"
                );
                Err(e)
            }
        }
    }
}
