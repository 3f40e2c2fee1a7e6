//! API error types with HTTP response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use saga::SagaError;

use crate::routes::transactions::MessageResponse;

/// API-level error type that maps to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request from the client.
    #[error("{0}")]
    BadRequest(String),
    /// Saga coordinator error.
    #[error(transparent)]
    Saga(#[from] SagaError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Saga(err) => saga_error_status(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        tracing::debug!(%status, error = %self, "request rejected");

        (status, Json(MessageResponse::failure(self.to_string()))).into_response()
    }
}

fn saga_error_status(err: &SagaError) -> StatusCode {
    match err {
        SagaError::Validation(_) => StatusCode::BAD_REQUEST,
        SagaError::TransactionNotFound(_) => StatusCode::NOT_FOUND,
        SagaError::DuplicateTransaction(_) | SagaError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
    }
}
