//! # Web Application State
//!
//! Shared state for the HTTP front door: the lifecycle engine handle every
//! request dispatches to.

use std::sync::Arc;

use crate::lifecycle::LifecycleEngine;

/// Shared application state for the HTTP front door.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LifecycleEngine>,
}

impl AppState {
    pub fn new(engine: Arc<LifecycleEngine>) -> Self {
        Self { engine }
    }
}
