//! # Messaging Module
//!
//! PostgreSQL message queue (pgmq) based messaging for the command
//! lifecycle: the inbound work queue the poller reads from, and the
//! outbound queue lifecycle events are published to.

pub mod message;
pub mod pgmq_client;

pub use message::*;
pub use pgmq_client::*;
