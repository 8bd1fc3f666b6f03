//! # HTTP Front Door
//!
//! Thin request/response mapping from three REST operations onto the
//! lifecycle engine. No business logic lives here; failures collapse to a
//! single generic error responder that logs the root cause and leaks no
//! internal detail.

pub mod handlers;
pub mod response_types;
pub mod state;

use axum::routing::{delete, post};
use axum::Router;

use crate::error::{CommandCoreError, Result};
use state::AppState;

/// Build the HTTP router for the command service.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/commands",
            post(handlers::commands::create_command).get(handlers::commands::list_commands),
        )
        .route("/commands/:id", delete(handlers::commands::delete_command))
        .with_state(state)
}

/// Bind and serve the HTTP front door until ctrl-c.
pub async fn serve(bind_address: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .map_err(|e| {
            CommandCoreError::Configuration(format!("Failed to bind {bind_address}: {e}"))
        })?;

    tracing::info!(bind_address = %bind_address, "HTTP front door listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CommandCoreError::Configuration(format!("HTTP server error: {e}")))
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("Failed to install ctrl-c handler; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
