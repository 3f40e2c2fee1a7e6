//! In-memory participant services for the order saga.
//!
//! Each participant is an independent record-keeper exposing create, cancel
//! and status operations over HTTP. Every operation answers with the shared
//! [`common::ParticipantResponse`] envelope.

pub mod config;
pub mod error;
pub mod order;
pub mod payment;
pub mod shipping;

use serde::Deserialize;

pub use config::Config;
pub use error::ServiceError;
pub use order::OrderService;
pub use payment::PaymentService;
pub use shipping::ShippingService;

/// Query string of the `*-status` endpoints.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub order_id: Option<String>,
}

impl StatusQuery {
    fn required_order_id(&self) -> Result<&str, ServiceError> {
        self.order_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::BadRequest("Order ID is required".to_string()))
    }
}
