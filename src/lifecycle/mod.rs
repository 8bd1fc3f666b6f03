//! # Lifecycle Module
//!
//! The command lifecycle engine (the one true state machine) and the
//! inbound queue poller that feeds it orchestrator-initiated work.

pub mod engine;
pub mod poller;

pub use engine::LifecycleEngine;
pub use poller::{CommandPoller, PollerConfig};
