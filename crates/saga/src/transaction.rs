//! Transaction and step records.

use chrono::{DateTime, Utc};
use common::{StartSagaRequest, TransactionId};
use serde::{Deserialize, Serialize};

use crate::error::SagaError;
use crate::state::{StepStatus, TransactionStatus};
use crate::steps::StepName;

/// How a ledgered step concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    /// Failed with the given error text.
    Failed(String),
}

/// One attempted participant operation within a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub name: StepName,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Step {
    fn started(name: StepName, at: DateTime<Utc>) -> Self {
        Self {
            name,
            status: StepStatus::Pending,
            started_at: at,
            ended_at: None,
            error: None,
        }
    }

    /// Returns true while the step has no end record.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// A single saga invocation.
///
/// Status only ever moves from `Pending` to one of the terminal states;
/// `completed_at` is set exactly when the status is terminal and
/// `failure_reason` only when it is `Failed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order_id: Option<String>,
    customer_id: String,
    amount: f64,
    address: String,
    status: TransactionStatus,
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure_reason: Option<String>,
    steps: Vec<Step>,
}

impl Transaction {
    /// Creates a pending transaction for a start request.
    pub fn new(id: TransactionId, request: &StartSagaRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            order_id: None,
            customer_id: request.customer_id.clone(),
            amount: request.amount,
            address: request.address.clone(),
            status: TransactionStatus::Pending,
            created_at,
            completed_at: None,
            failure_reason: None,
            steps: Vec::new(),
        }
    }

    /// Records the order reference assigned by the order participant.
    pub fn set_order_id(&mut self, order_id: impl Into<String>) {
        self.order_id = Some(order_id.into());
    }

    /// Moves the transaction to `Completed`.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), SagaError> {
        self.transition(TransactionStatus::Completed, at)
    }

    /// Moves the transaction to `Failed` with a human-readable reason.
    pub fn fail(&mut self, reason: impl Into<String>, at: DateTime<Utc>) -> Result<(), SagaError> {
        self.transition(TransactionStatus::Failed, at)?;
        self.failure_reason = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, to: TransactionStatus, at: DateTime<Utc>) -> Result<(), SagaError> {
        if !self.status.can_transition_to(to) {
            return Err(SagaError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        self.status = to;
        self.completed_at = Some(at);
        Ok(())
    }

    /// Appends a pending step.
    pub fn begin_step(&mut self, name: StepName, at: DateTime<Utc>) {
        self.steps.push(Step::started(name, at));
    }

    /// Closes the most recent open step with the given name.
    ///
    /// Returns false if no such step exists.
    pub fn end_step(&mut self, name: StepName, outcome: StepOutcome, at: DateTime<Utc>) -> bool {
        let Some(step) = self
            .steps
            .iter_mut()
            .rev()
            .find(|s| s.name == name && s.is_open())
        else {
            return false;
        };

        step.ended_at = Some(at);
        match outcome {
            StepOutcome::Completed => step.status = StepStatus::Completed,
            StepOutcome::Failed(error) => {
                step.status = StepStatus::Failed;
                step.error = Some(error);
            }
        }
        true
    }
}

// Query methods
impl Transaction {
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Returns the participant-assigned order reference, once known.
    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the failure reason, set only when the status is `Failed`.
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Returns the step ledger in the order steps were started.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns `(name, status)` pairs for every ledgered step.
    pub fn step_summary(&self) -> Vec<(StepName, StepStatus)> {
        self.steps.iter().map(|s| (s.name, s.status)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StartSagaRequest {
        StartSagaRequest {
            customer_id: "CUST-1".to_string(),
            items: Vec::new(),
            amount: 99.5,
            address: "1 Main St".to_string(),
        }
    }

    fn pending() -> Transaction {
        Transaction::new(TransactionId::from_sequence(1), &request(), Utc::now())
    }

    #[test]
    fn test_new_transaction_is_pending() {
        let tx = pending();
        assert_eq!(tx.id().as_str(), "TRX-1");
        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert_eq!(tx.customer_id(), "CUST-1");
        assert_eq!(tx.amount(), 99.5);
        assert_eq!(tx.address(), "1 Main St");
        assert!(tx.order_id().is_none());
        assert!(tx.completed_at().is_none());
        assert!(tx.failure_reason().is_none());
        assert!(tx.steps().is_empty());
    }

    #[test]
    fn test_complete_sets_completed_at() {
        let mut tx = pending();
        tx.complete(Utc::now()).unwrap();
        assert_eq!(tx.status(), TransactionStatus::Completed);
        assert!(tx.completed_at().is_some());
        assert!(tx.failure_reason().is_none());
    }

    #[test]
    fn test_fail_records_reason() {
        let mut tx = pending();
        tx.fail("Failed to create order: boom", Utc::now()).unwrap();
        assert_eq!(tx.status(), TransactionStatus::Failed);
        assert!(tx.completed_at().is_some());
        assert_eq!(tx.failure_reason(), Some("Failed to create order: boom"));
    }

    #[test]
    fn test_terminal_status_is_final() {
        let mut tx = pending();
        tx.complete(Utc::now()).unwrap();
        let before = tx.clone();

        let err = tx.fail("late failure", Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            SagaError::InvalidTransition {
                from: TransactionStatus::Completed,
                to: TransactionStatus::Failed
            }
        ));
        assert!(tx.complete(Utc::now()).is_err());
        assert_eq!(tx, before);
    }

    #[test]
    fn test_end_step_closes_most_recent_open_step() {
        let mut tx = pending();
        tx.begin_step(StepName::CancelOrder, Utc::now());
        assert!(tx.end_step(StepName::CancelOrder, StepOutcome::Completed, Utc::now()));
        tx.begin_step(StepName::CancelOrder, Utc::now());
        assert!(tx.end_step(
            StepName::CancelOrder,
            StepOutcome::Failed("Order not found".to_string()),
            Utc::now()
        ));

        let steps = tx.steps();
        assert_eq!(steps[0].status, StepStatus::Completed);
        assert!(steps[0].error.is_none());
        assert_eq!(steps[1].status, StepStatus::Failed);
        assert_eq!(steps[1].error.as_deref(), Some("Order not found"));
        assert!(steps.iter().all(|s| !s.is_open()));
    }

    #[test]
    fn test_end_step_without_open_step_is_noop() {
        let mut tx = pending();
        assert!(!tx.end_step(StepName::CreateOrder, StepOutcome::Completed, Utc::now()));

        tx.begin_step(StepName::CreateOrder, Utc::now());
        tx.end_step(StepName::CreateOrder, StepOutcome::Completed, Utc::now());
        let before = tx.clone();
        assert!(!tx.end_step(
            StepName::CreateOrder,
            StepOutcome::Failed("again".to_string()),
            Utc::now()
        ));
        assert_eq!(tx, before);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let mut tx = pending();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["id"], "TRX-1");
        assert_eq!(json["status"], "PENDING");
        assert!(json.get("completed_at").is_none());
        assert!(json.get("failure_reason").is_none());
        assert!(json.get("order_id").is_none());

        tx.set_order_id("ORD-4");
        tx.begin_step(StepName::CreateOrder, Utc::now());
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["order_id"], "ORD-4");
        assert_eq!(json["steps"][0]["name"], "CREATE_ORDER");
        assert_eq!(json["steps"][0]["status"], "PENDING");
    }
}
