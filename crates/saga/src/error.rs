//! Saga error types.

use common::TransactionId;
use thiserror::Error;

use crate::state::TransactionStatus;

/// Errors raised by a participant call.
///
/// The `Display` text of each variant is what ends up in the step ledger and
/// in the transaction's failure reason.
#[derive(Debug, Error)]
pub enum ParticipantError {
    /// The request never produced a response (connection refused, reset, ...).
    #[error("{0}")]
    Transport(String),

    /// The participant answered with a body that is not a response envelope.
    #[error("malformed response (HTTP {status}): {body}")]
    MalformedResponse { status: u16, body: String },

    /// The participant answered successfully but left out a field the saga needs.
    #[error("response is missing {0}")]
    MissingField(&'static str),

    /// The participant answered with `success: false`.
    #[error("{0}")]
    Rejected(String),

    /// The request payload could not be encoded.
    #[error("failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors that can occur during saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// The start request failed boundary validation.
    #[error("{0}")]
    Validation(String),

    /// No transaction with the given ID exists.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// A transaction with the given ID already exists.
    #[error("Transaction already exists: {0}")]
    DuplicateTransaction(TransactionId),

    /// The transaction is terminal and cannot move to another status.
    #[error("Invalid transaction transition: {from} -> {to}")]
    InvalidTransition {
        from: TransactionStatus,
        to: TransactionStatus,
    },
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;
