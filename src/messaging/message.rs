//! # Message Structures for the Command Queues
//!
//! Wire formats for the inbound work queue and the outbound orchestrator
//! queue. The original FIFO attributes (deduplication key, group key)
//! travel inside the JSON envelope since pgmq carries no native message
//! attributes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{CommandCoreError, Result};
use crate::models::Command;

/// Actions an inbound queue message can carry.
///
/// Exhaustively matched by the poller; a body whose action is not one of
/// these fails to parse and is left un-acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InboundAction {
    Create,
    Validate,
    Cancel,
    Delete,
}

/// Body of an inbound queue message.
///
/// `command` is the JSON-encoded command; for `DELETE` it may be a partial
/// object carrying at least the id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    pub action: InboundAction,
    pub command: Value,
}

/// Minimal command reference for `DELETE` messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandKey {
    pub id: Uuid,
}

/// Actions published to the orchestrator queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventAction {
    Create,
    Created,
    Validated,
    Canceled,
    Deleted,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "CREATE"),
            Self::Created => write!(f, "CREATED"),
            Self::Validated => write!(f, "VALIDATED"),
            Self::Canceled => write!(f, "CANCELED"),
            Self::Deleted => write!(f, "DELETED"),
        }
    }
}

/// Outbound lifecycle event envelope.
///
/// `deduplication_id` is freshly generated per publish, so identical
/// republishes after a redelivery are NOT deduplicated by this key alone.
/// `group_id` (`"Commands-" + id`) orders all events for one command
/// relative to each other; events for different commands interleave freely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEvent {
    pub action: EventAction,
    pub command: Value,
    pub deduplication_id: Uuid,
    pub group_id: String,
}

impl CommandEvent {
    /// Build an event for a raw command payload.
    pub fn new(action: EventAction, command_id: Uuid, command: Value) -> Self {
        Self {
            action,
            command,
            deduplication_id: Uuid::new_v4(),
            group_id: format!("Commands-{command_id}"),
        }
    }

    /// Build an event carrying a full command record.
    pub fn for_command(action: EventAction, command: &Command) -> Result<Self> {
        let payload = serde_json::to_value(command)
            .map_err(|e| CommandCoreError::Validation(format!("Unserializable command: {e}")))?;
        Ok(Self::new(action, command.id, payload))
    }
}
