//! The fixed vocabulary of participant operations.

use serde::{Deserialize, Serialize};

/// A participant service reachable at its own base address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Participant {
    Order,
    Payment,
    Shipping,
}

impl Participant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Participant::Order => "Order",
            Participant::Payment => "Payment",
            Participant::Shipping => "Shipping",
        }
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named operation the executor invokes on a participant.
///
/// Forward steps run in [`StepName::FORWARD`] order; each has exactly one
/// compensating step that semantically undoes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepName {
    CreateOrder,
    CancelOrder,
    ProcessPayment,
    RefundPayment,
    StartShipping,
    CancelShipping,
}

impl StepName {
    /// The forward sequence of an order saga.
    pub const FORWARD: [StepName; 3] = [
        StepName::CreateOrder,
        StepName::ProcessPayment,
        StepName::StartShipping,
    ];

    /// Returns the wire name of the step.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepName::CreateOrder => "CREATE_ORDER",
            StepName::CancelOrder => "CANCEL_ORDER",
            StepName::ProcessPayment => "PROCESS_PAYMENT",
            StepName::RefundPayment => "REFUND_PAYMENT",
            StepName::StartShipping => "START_SHIPPING",
            StepName::CancelShipping => "CANCEL_SHIPPING",
        }
    }

    /// Returns the participant that performs this operation.
    pub fn participant(&self) -> Participant {
        match self {
            StepName::CreateOrder | StepName::CancelOrder => Participant::Order,
            StepName::ProcessPayment | StepName::RefundPayment => Participant::Payment,
            StepName::StartShipping | StepName::CancelShipping => Participant::Shipping,
        }
    }

    /// Returns the operation path on the participant's base address.
    pub fn path(&self) -> &'static str {
        match self {
            StepName::CreateOrder => "/create-order",
            StepName::CancelOrder => "/cancel-order",
            StepName::ProcessPayment => "/process-payment",
            StepName::RefundPayment => "/refund-payment",
            StepName::StartShipping => "/start-shipping",
            StepName::CancelShipping => "/cancel-shipping",
        }
    }

    /// Returns the compensating operation for a forward step.
    pub fn compensation(&self) -> Option<StepName> {
        match self {
            StepName::CreateOrder => Some(StepName::CancelOrder),
            StepName::ProcessPayment => Some(StepName::RefundPayment),
            StepName::StartShipping => Some(StepName::CancelShipping),
            _ => None,
        }
    }

    /// Prefix of the transaction failure reason when this step fails.
    ///
    /// Compensations never decide the outcome, so they have none.
    pub fn failure_prefix(&self) -> Option<&'static str> {
        match self {
            StepName::CreateOrder => Some("Failed to create order"),
            StepName::ProcessPayment => Some("Failed to process payment"),
            StepName::StartShipping => Some("Failed to start shipping"),
            StepName::CancelOrder | StepName::RefundPayment | StepName::CancelShipping => None,
        }
    }
}

impl std::fmt::Display for StepName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
