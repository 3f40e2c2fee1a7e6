//! Payment participant: charges and refunds orders.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{IdSequence, OrderRef, ParticipantResponse, ProcessPaymentPayload};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::StatusQuery;
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Success => "SUCCESS",
            PaymentStatus::Failed => "FAILED",
            PaymentStatus::Refunded => "REFUNDED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: String,
    pub order_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
}

#[derive(Debug)]
struct PaymentState {
    payments: Vec<Payment>,
    ids: IdSequence,
    decline_all: bool,
}

/// In-memory payment service.
///
/// Declined charges are still recorded, with status `FAILED`.
#[derive(Debug, Clone)]
pub struct PaymentService {
    state: Arc<RwLock<PaymentState>>,
}

impl PaymentService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(PaymentState {
                payments: Vec::new(),
                ids: IdSequence::new("PAY"),
                decline_all: false,
            })),
        }
    }

    /// Configures the service to decline every charge.
    pub async fn set_decline_all(&self, decline: bool) {
        self.state.write().await.decline_all = decline;
    }

    /// Charges an order. The returned payment's status tells whether it was declined.
    pub async fn process(&self, payload: ProcessPaymentPayload) -> Result<Payment, ServiceError> {
        if payload.order_id.is_empty() {
            return Err(ServiceError::BadRequest("Order ID is required".to_string()));
        }
        if payload.amount <= 0.0 {
            return Err(ServiceError::BadRequest(
                "Amount must be greater than zero".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let status = if state.decline_all {
            PaymentStatus::Failed
        } else {
            PaymentStatus::Success
        };
        let payment = Payment {
            id: state.ids.next_id(),
            order_id: payload.order_id,
            amount: payload.amount,
            status,
        };
        state.payments.push(payment.clone());
        Ok(payment)
    }

    /// Refunds the first successful payment of an order.
    pub async fn refund(&self, order_id: &str) -> Result<Payment, ServiceError> {
        let mut state = self.state.write().await;
        let payment = state
            .payments
            .iter_mut()
            .find(|p| p.order_id == order_id && p.status == PaymentStatus::Success)
            .ok_or_else(|| {
                ServiceError::NotFound("No successful payment found for the order".to_string())
            })?;
        payment.status = PaymentStatus::Refunded;
        Ok(payment.clone())
    }

    pub async fn find_by_order(&self, order_id: &str) -> Option<Payment> {
        self.state
            .read()
            .await
            .payments
            .iter()
            .find(|p| p.order_id == order_id)
            .cloned()
    }

    /// Returns the number of payments currently in `status`.
    pub async fn count_with_status(&self, status: PaymentStatus) -> usize {
        self.state
            .read()
            .await
            .payments
            .iter()
            .filter(|p| p.status == status)
            .count()
    }
}

impl Default for PaymentService {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes: `POST /process-payment`, `POST /refund-payment`, `GET /payment-status`.
pub fn router(service: PaymentService) -> Router {
    Router::new()
        .route("/process-payment", post(process))
        .route("/refund-payment", post(refund))
        .route("/payment-status", get(status))
        .with_state(service)
}

#[tracing::instrument(skip(service))]
async fn process(
    State(service): State<PaymentService>,
    Json(payload): Json<ProcessPaymentPayload>,
) -> Result<(StatusCode, Json<ParticipantResponse>), ServiceError> {
    let payment = service.process(payload).await?;
    tracing::info!(
        payment_id = %payment.id,
        order_id = %payment.order_id,
        status = payment.status.as_str(),
        "payment processed"
    );

    let (code, envelope) = match payment.status {
        PaymentStatus::Success => (
            StatusCode::OK,
            ParticipantResponse::ok("Payment processed successfully"),
        ),
        _ => (
            StatusCode::BAD_REQUEST,
            ParticipantResponse::rejected("Payment processing failed"),
        ),
    };

    Ok((
        code,
        Json(
            envelope
                .with_payment_id(payment.id)
                .with_order_id(payment.order_id)
                .with_status(payment.status.as_str()),
        ),
    ))
}

#[tracing::instrument(skip(service))]
async fn refund(
    State(service): State<PaymentService>,
    Json(req): Json<OrderRef>,
) -> Result<Json<ParticipantResponse>, ServiceError> {
    let payment = service.refund(&req.order_id).await?;
    tracing::info!(payment_id = %payment.id, order_id = %payment.order_id, "payment refunded");

    Ok(Json(
        ParticipantResponse::ok("Payment refunded successfully")
            .with_payment_id(payment.id)
            .with_order_id(payment.order_id)
            .with_status(payment.status.as_str()),
    ))
}

async fn status(
    State(service): State<PaymentService>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ParticipantResponse>, ServiceError> {
    let order_id = query.required_order_id()?;
    let payment = service
        .find_by_order(order_id)
        .await
        .ok_or_else(|| ServiceError::NotFound("No payment found for the order".to_string()))?;

    Ok(Json(
        ParticipantResponse::ok("")
            .with_payment_id(payment.id)
            .with_order_id(payment.order_id)
            .with_status(payment.status.as_str()),
    ))
}
