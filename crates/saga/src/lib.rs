//! Saga orchestrator for order processing.
//!
//! This crate coordinates a multi-step transaction across three independently
//! owned participant services, undoing completed work with compensating
//! actions when a later step fails.
//!
//! The order saga follows these steps:
//! 1. Create order (compensated by cancel order)
//! 2. Process payment (compensated by refund payment)
//! 3. Start shipping
//!
//! If any step fails, previously completed steps are compensated in reverse
//! order and the transaction ends `FAILED` with a human-readable reason.

pub mod coordinator;
pub mod error;
pub mod executor;
pub mod ledger;
pub mod participant;
pub mod state;
pub mod steps;
pub mod store;
pub mod transaction;

pub use coordinator::SagaCoordinator;
pub use error::{ParticipantError, Result, SagaError};
pub use executor::SagaExecutor;
pub use ledger::StepLedger;
pub use participant::{
    HttpParticipantClient, InMemoryParticipantClient, ParticipantClient, ParticipantEndpoints,
};
pub use state::{StepStatus, TransactionStatus};
pub use steps::{Participant, StepName};
pub use store::{InMemoryTransactionStore, TransactionStore};
pub use transaction::{Step, StepOutcome, Transaction};
