//! Scripted in-memory participant client for tests and local runs.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{IdSequence, ParticipantResponse};

use super::ParticipantClient;
use crate::error::ParticipantError;
use crate::steps::StepName;

#[derive(Debug)]
struct InMemoryParticipantState {
    calls: Vec<(StepName, serde_json::Value)>,
    failing: HashSet<StepName>,
    orders: IdSequence,
    payments: IdSequence,
    shipments: IdSequence,
}

impl Default for InMemoryParticipantState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            failing: HashSet::new(),
            orders: IdSequence::new("ORD"),
            payments: IdSequence::new("PAY"),
            shipments: IdSequence::new("SHP"),
        }
    }
}

/// In-memory participant client.
///
/// Every call is recorded; steps configured with [`set_fail_on`] answer
/// with a rejection instead of a success envelope.
///
/// [`set_fail_on`]: InMemoryParticipantClient::set_fail_on
#[derive(Debug, Clone, Default)]
pub struct InMemoryParticipantClient {
    state: Arc<RwLock<InMemoryParticipantState>>,
}

impl InMemoryParticipantClient {
    /// Creates a client where every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the given operation to be rejected.
    pub fn set_fail_on(&self, step: StepName, fail: bool) {
        let mut state = self.state.write().unwrap();
        if fail {
            state.failing.insert(step);
        } else {
            state.failing.remove(&step);
        }
    }

    /// Returns the operations called so far, in call order.
    pub fn calls(&self) -> Vec<StepName> {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .map(|(step, _)| *step)
            .collect()
    }

    /// Returns the payloads sent to the given operation.
    pub fn payloads(&self, step: StepName) -> Vec<serde_json::Value> {
        self.state
            .read()
            .unwrap()
            .calls
            .iter()
            .filter(|(s, _)| *s == step)
            .map(|(_, payload)| payload.clone())
            .collect()
    }
}

#[async_trait]
impl ParticipantClient for InMemoryParticipantClient {
    async fn call(
        &self,
        step: StepName,
        payload: serde_json::Value,
    ) -> Result<ParticipantResponse, ParticipantError> {
        let mut state = self.state.write().unwrap();
        let order_id = payload
            .get("order_id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        state.calls.push((step, payload));

        if state.failing.contains(&step) {
            return Err(ParticipantError::Rejected(format!(
                "{} unavailable",
                step.participant()
            )));
        }

        let response = match step {
            StepName::CreateOrder => ParticipantResponse::ok("Order created successfully")
                .with_order_id(state.orders.next_id())
                .with_status("PENDING"),
            StepName::CancelOrder => {
                ParticipantResponse::ok("Order cancelled successfully").with_status("CANCELLED")
            }
            StepName::ProcessPayment => ParticipantResponse::ok("Payment processed successfully")
                .with_payment_id(state.payments.next_id())
                .with_status("SUCCESS"),
            StepName::RefundPayment => {
                ParticipantResponse::ok("Payment refunded successfully").with_status("REFUNDED")
            }
            StepName::StartShipping => ParticipantResponse::ok("Shipping initiated successfully")
                .with_shipping_id(state.shipments.next_id())
                .with_status("PENDING"),
            StepName::CancelShipping => {
                ParticipantResponse::ok("Shipping cancelled successfully").with_status("CANCELLED")
            }
        };

        Ok(match (response.order_id.is_none(), order_id) {
            (true, Some(order_id)) => response.with_order_id(order_id),
            _ => response,
        })
    }
}
