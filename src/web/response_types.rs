//! # Web API Error Types
//!
//! The single generic error responder for the HTTP front door. Every
//! failure maps to a 500 with a generic body; the root cause is logged
//! here and never leaked to the caller.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::CommandCoreError;

/// Web API error surface.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Internal server error")]
    Internal(#[from] CommandCoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let ApiError::Internal(cause) = &self;
        error!(error = %cause, "Request failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Internal Server Error" })),
        )
            .into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
