//! Saga start and transaction status endpoints.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use common::{StartSagaRequest, TransactionId};
use saga::{ParticipantClient, SagaCoordinator, Transaction, TransactionStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all handlers.
pub struct AppState<S, C> {
    pub coordinator: SagaCoordinator<S, C>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub transaction_id: Option<String>,
}

// -- Response types --

/// Envelope carrying a transaction snapshot.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub message: String,
    pub transaction: Transaction,
}

/// Envelope without a payload, used for errors.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

// -- Handlers --

/// POST /create-order-saga: record a pending transaction and start its saga.
#[tracing::instrument(skip(state, body))]
pub async fn create_order_saga<S, C>(
    State(state): State<std::sync::Arc<AppState<S, C>>>,
    body: Result<Json<StartSagaRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TransactionResponse>), ApiError>
where
    S: TransactionStore + Clone + 'static,
    C: ParticipantClient + 'static,
{
    let Json(request) = body.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let transaction = state.coordinator.start(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(TransactionResponse {
            success: true,
            message: "Transaction initiated successfully".to_string(),
            transaction,
        }),
    ))
}

/// GET /transaction-status: return the current snapshot of a transaction.
#[tracing::instrument(skip(state))]
pub async fn transaction_status<S, C>(
    State(state): State<std::sync::Arc<AppState<S, C>>>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<TransactionResponse>, ApiError>
where
    S: TransactionStore + Clone + 'static,
    C: ParticipantClient + 'static,
{
    let id = query
        .transaction_id
        .filter(|id| !id.trim().is_empty())
        .map(TransactionId::from)
        .ok_or_else(|| ApiError::BadRequest("Transaction ID is required".to_string()))?;

    let transaction = state.coordinator.status(&id).await?;

    Ok(Json(TransactionResponse {
        success: true,
        message: String::new(),
        transaction,
    }))
}
