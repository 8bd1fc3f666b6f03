//! # Command Core
//!
//! Tracks commands (work orders) through their lifecycle, coordinating a
//! synchronous HTTP front door with an asynchronous, queue-driven
//! orchestration pipeline.
//!
//! ## Architecture
//!
//! Two entry points drive the same state machine:
//!
//! - the **HTTP front door** (`POST /commands`, `DELETE /commands/:id`,
//!   `GET /commands`) for client-initiated transitions, and
//! - the **inbound queue poller**, which long-polls the work queue and
//!   dispatches orchestrator-initiated transitions (`CREATE`, `VALIDATE`,
//!   `CANCEL`, `DELETE`).
//!
//! Every transition runs the same ordered protocol: mutate the record store,
//! publish the resulting event to the orchestrator queue, then (for
//! queue-triggered transitions) acknowledge the inbound message. The store
//! write always completes before the publish begins; a failed step aborts
//! the rest of the sequence.
//!
//! ## Module Organization
//!
//! - [`models`] - Command records and the PostgreSQL record store
//! - [`messaging`] - pgmq queue client and message envelopes
//! - [`lifecycle`] - The lifecycle engine and the inbound queue poller
//! - [`web`] - Axum HTTP front door
//! - [`config`] - Environment-driven process configuration
//! - [`error`] - Structured error handling
//!
//! ## Delivery semantics
//!
//! Queue processing is at-least-once: a message that is not acknowledged
//! within its visibility timeout becomes visible again and is re-dispatched
//! by a later poll tick. Status transitions are idempotent under
//! redelivery; outbound events may be duplicated and carry a fresh
//! deduplication id per publish.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod messaging;
pub mod models;
pub mod web;

pub use config::CommandCoreConfig;
pub use error::{CommandCoreError, Result};
pub use lifecycle::{CommandPoller, LifecycleEngine, PollerConfig};
pub use messaging::{CommandEvent, EventAction, InboundAction, InboundMessage, QueueClient};
pub use models::{Command, CommandStatus, CommandStore};
