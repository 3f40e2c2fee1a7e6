//! Participant error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use common::ParticipantResponse;
use thiserror::Error;

/// Errors a participant reports back to its caller.
///
/// Every variant renders as a `success: false` envelope so callers can read
/// the message the same way they read a declined operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(ParticipantResponse::rejected(self.to_string()))).into_response()
    }
}
