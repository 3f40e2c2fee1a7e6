//! Order participant: creates and cancels orders.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{CreateOrderPayload, IdSequence, Item, OrderRef, ParticipantResponse};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::StatusQuery;
use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub amount: f64,
    pub status: OrderStatus,
    pub items: Vec<Item>,
}

#[derive(Debug)]
struct OrderState {
    orders: Vec<Order>,
    ids: IdSequence,
}

/// In-memory order service.
#[derive(Debug, Clone)]
pub struct OrderService {
    state: Arc<RwLock<OrderState>>,
}

impl OrderService {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(OrderState {
                orders: Vec::new(),
                ids: IdSequence::new("ORD"),
            })),
        }
    }

    /// Creates a pending order.
    ///
    /// An amount of zero is replaced by the sum of the item line totals.
    pub async fn create(&self, payload: CreateOrderPayload) -> Order {
        let amount = if payload.amount == 0.0 {
            payload.items.iter().map(Item::line_total).sum()
        } else {
            payload.amount
        };

        let mut state = self.state.write().await;
        let order = Order {
            id: state.ids.next_id(),
            customer_id: payload.customer_id,
            amount,
            status: OrderStatus::Pending,
            items: payload.items,
        };
        state.orders.push(order.clone());
        order
    }

    /// Marks an order cancelled.
    pub async fn cancel(&self, order_id: &str) -> Result<Order, ServiceError> {
        let mut state = self.state.write().await;
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        order.status = OrderStatus::Cancelled;
        Ok(order.clone())
    }

    pub async fn get(&self, order_id: &str) -> Option<Order> {
        self.state
            .read()
            .await
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
    }

    pub async fn count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}

impl Default for OrderService {
    fn default() -> Self {
        Self::new()
    }
}

/// Routes: `POST /create-order`, `POST /cancel-order`, `GET /order-status`.
pub fn router(service: OrderService) -> Router {
    Router::new()
        .route("/create-order", post(create))
        .route("/cancel-order", post(cancel))
        .route("/order-status", get(status))
        .with_state(service)
}

#[tracing::instrument(skip(service, payload), fields(customer_id = %payload.customer_id))]
async fn create(
    State(service): State<OrderService>,
    Json(payload): Json<CreateOrderPayload>,
) -> (StatusCode, Json<ParticipantResponse>) {
    let order = service.create(payload).await;
    tracing::info!(order_id = %order.id, status = order.status.as_str(), "order created");

    (
        StatusCode::CREATED,
        Json(
            ParticipantResponse::ok("Order created successfully")
                .with_order_id(order.id)
                .with_status(order.status.as_str()),
        ),
    )
}

#[tracing::instrument(skip(service))]
async fn cancel(
    State(service): State<OrderService>,
    Json(req): Json<OrderRef>,
) -> Result<Json<ParticipantResponse>, ServiceError> {
    let order = service.cancel(&req.order_id).await?;
    tracing::info!(order_id = %order.id, "order cancelled");

    Ok(Json(
        ParticipantResponse::ok("Order cancelled successfully")
            .with_order_id(order.id)
            .with_status(order.status.as_str()),
    ))
}

async fn status(
    State(service): State<OrderService>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<ParticipantResponse>, ServiceError> {
    let order_id = query.required_order_id()?;
    let order = service
        .get(order_id)
        .await
        .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

    Ok(Json(
        ParticipantResponse::ok("")
            .with_order_id(order.id)
            .with_status(order.status.as_str()),
    ))
}
