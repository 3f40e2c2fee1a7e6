//! Shipping participant: starts and cancels shipments.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{IdSequence, OrderRef, ParticipantResponse, StartShippingPayload};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::StatusQuery;
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingStatus {
    Pending,
    Cancelled,
}

impl ShippingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingStatus::Pending => "PENDING",
            ShippingStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub order_id: String,
    pub address: String,
    pub status: ShippingStatus,
}

#[derive(Debug)]
struct ShippingState {
    shipments: Vec<Shipment>,
    ids: IdSequence,
    fail_all: bool,
}

/// In-memory shipping service.
#[derive(Debug, Clone)]
pub struct ShippingService {
    state: Arc<RwLock<ShippingState>>,
}

impl ShippingService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(ShippingState {
                shipments: Vec::new(),
                ids: IdSequence::new("SHP"),
                fail_all: false,
            })),
        }
    }

    /// Configures the service to fail every shipment it is asked to start.
    pub async fn set_fail_all(&self, fail: bool) {
        self.state.write().await.fail_all = fail;
    }

    /// Starts a shipment. A failed start is recorded as `CANCELLED`.
    pub async fn start(&self, payload: StartShippingPayload) -> Result<Shipment, ServiceError> {
        if payload.order_id.is_empty() {
            return Err(ServiceError::BadRequest("Order ID is required".to_string()));
        }
        if payload.address.is_empty() {
            return Err(ServiceError::BadRequest(
                "Shipping address is required".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        let status = if state.fail_all {
            ShippingStatus::Cancelled
        } else {
            ShippingStatus::Pending
        };
        let shipment = Shipment {
            id: state.ids.next_id(),
            order_id: payload.order_id,
            address: payload.address,
            status,
        };
        state.shipments.push(shipment.clone());
        Ok(shipment)
    }

    /// Cancels the first active shipment of an order.
    pub async fn cancel(&self, order_id: &str) -> Result<Shipment, ServiceError> {
        let mut state = self.state.write().await;
        let shipment = state
            .shipments
            .iter_mut()
            .find(|s| s.order_id == order_id && s.status != ShippingStatus::Cancelled)
            .ok_or_else(|| {
                ServiceError::NotFound("No active shipping found for the order".to_string())
            })?;
        shipment.status = ShippingStatus::Cancelled;
        Ok(shipment.clone())
    }

    pub async fn find_by_order(&self, order_id: &str) -> Option<Shipment> {
        self.state
            .read()
            .await
            .shipments
            .iter()
            .find(|s| s.order_id == order_id)
            .cloned()
    }

    /// Returns the number of shipments that are not cancelled.
    pub async fn active_count(&self) -> usize {
        self.state
            .read()
            .await
            .shipments
            .iter()
            .filter(|s| s.status != ShippingStatus::Cancelled)
            .count()
    }
}

impl Default for ShippingService {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes: `POST /start-shipping`, `POST /cancel-shipping`, `GET /shipping-status`.
pub fn router(service: ShippingService) -> Router {
    Router::new()
        .route("/start-shipping", post(start))
        .route("/cancel-shipping", post(cancel))
        .route("/shipping-status", get(status))
        .with_state(service)
}

#[tracing::instrument(skip(service))]
async fn start(
    State(service): State<ShippingService>,
    Json(payload): Json<StartShippingPayload>,
) -> Result<(StatusCode, Json<ParticipantResponse>), ServiceError> {
    let shipment = service.start(payload).await?;
    tracing::info!(
        shipping_id = %shipment.id,
        order_id = %shipment.order_id,
        status = shipment.status.as_str(),
        "shipping initiated"
    );

    let (code, envelope) = match shipment.status {
        ShippingStatus::Pending => (
            StatusCode::OK,
            ParticipantResponse::ok("Shipping initiated successfully"),
        ),
        ShippingStatus::Cancelled => (
            StatusCode::BAD_REQUEST,
            ParticipantResponse::rejected("Failed to initiate shipping"),
        ),
    };

    Ok((
        code,
        Json(
            envelope
                .with_shipping_id(shipment.id)
                .with_order_id(shipment.order_id)
                .with_status(shipment.status.as_str()),
        ),
    ))
}

#[tracing::instrument(skip(service))]
async fn cancel(
    State(service): State<ShippingService>,
    Json(req): Json<OrderRef>,
) -> Result<Json<ParticipantResponse>, ServiceError> {
    let shipment = service.cancel(&req.order_id).await?;
    tracing::info!(shipping_id = %shipment.id, order_id = %shipment.order_id, "shipping cancelled");

    Ok(Json(
        ParticipantResponse::ok("Shipping cancelled successfully")
            .with_shipping_id(shipment.id)
            .with_order_id(shipment.order_id)
            .with_status(shipment.status.as_str()),
    ))
}

async fn status(
    State(service): State<ShippingService>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ParticipantResponse>, ServiceError> {
    let order_id = query.required_order_id()?;
    let shipment = service
        .find_by_order(order_id)
        .await
        .ok_or_else(|| ServiceError::NotFound("No shipping found for the order".to_string()))?;

    Ok(Json(
        ParticipantResponse::ok("")
            .with_shipping_id(shipment.id)
            .with_order_id(shipment.order_id)
            .with_status(shipment.status.as_str()),
    ))
}
