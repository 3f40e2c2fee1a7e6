//! Shared types for the saga orchestrator and its participant services.

pub mod types;
pub mod wire;

pub use types::{IdSequence, TransactionId};
pub use wire::{
    CreateOrderPayload, Item, OrderRef, ParticipantResponse, ProcessPaymentPayload,
    StartSagaRequest, StartShippingPayload,
};
