//! # Command Handlers
//!
//! HTTP handlers for command creation, deletion, and listing. Each maps a
//! REST operation onto the matching lifecycle engine entry point.

use axum::extract::{Host, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::models::Command;
use crate::web::response_types::ApiResult;
use crate::web::state::AppState;

/// Request body for command creation; `items` stays opaque.
#[derive(Debug, Deserialize)]
pub struct CreateCommandRequest {
    pub items: serde_json::Value,
}

/// Create a new command: POST /commands
///
/// Returns 201 with a `Location` header pointing at the new resource and
/// the created record as body.
pub async fn create_command(
    State(state): State<AppState>,
    Host(host): Host,
    Json(request): Json<CreateCommandRequest>,
) -> ApiResult<impl IntoResponse> {
    let command = state.engine.create_command(request.items).await?;

    info!(command_id = %command.id, "Command created via HTTP");

    let location = format!("http://{host}/commands/{}", command.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(command),
    ))
}

/// Delete a command: DELETE /commands/:id
///
/// Idempotent; deleting an unknown id still returns 200.
pub async fn delete_command(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.engine.delete_command(id).await?;

    info!(command_id = %id, "Command deleted via HTTP");
    Ok(StatusCode::OK)
}

/// List all commands: GET /commands
pub async fn list_commands(State(state): State<AppState>) -> ApiResult<Json<Vec<Command>>> {
    let commands = state.engine.list_commands().await?;
    Ok(Json(commands))
}
