//! JSON payloads exchanged between the coordinator and participant services.

use serde::{Deserialize, Serialize};

/// A line item carried through the saga to the order participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    /// Unit price.
    pub price: f64,
    pub quantity: u32,
}

impl Item {
    /// Returns `price * quantity`.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Request accepted by the coordinator to start an order saga.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartSagaRequest {
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<Item>,
    pub amount: f64,
    pub address: String,
}

/// Body of `POST /create-order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateOrderPayload {
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub amount: f64,
}

/// Body of `POST /process-payment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessPaymentPayload {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub amount: f64,
}

/// Body of `POST /start-shipping`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartShippingPayload {
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub address: String,
}

/// Body of every compensating operation: cancel-order, refund-payment and
/// cancel-shipping all address their record by order reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRef {
    pub order_id: String,
}

/// Normalized response envelope returned by every participant operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ParticipantResponse {
    /// A successful envelope with the given message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    /// A rejected envelope with the given message.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_payment_id(mut self, payment_id: impl Into<String>) -> Self {
        self.payment_id = Some(payment_id.into());
        self
    }

    pub fn with_shipping_id(mut self, shipping_id: impl Into<String>) -> Self {
        self.shipping_id = Some(shipping_id.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}
