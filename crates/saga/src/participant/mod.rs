//! Participant client trait and implementations.
//!
//! The executor reaches every participant through [`ParticipantClient`]; the
//! step name alone determines which participant is called and on which
//! operation path.

pub mod http;
pub mod memory;

use async_trait::async_trait;
use common::ParticipantResponse;

use crate::error::ParticipantError;
use crate::steps::{Participant, StepName};

pub use http::HttpParticipantClient;
pub use memory::InMemoryParticipantClient;

/// Issues one synchronous call to a participant operation.
///
/// Implementations must not retry. Any transport failure, unparseable body
/// or `success: false` envelope is returned as an error.
#[async_trait]
pub trait ParticipantClient: Send + Sync {
    async fn call(
        &self,
        step: StepName,
        payload: serde_json::Value,
    ) -> Result<ParticipantResponse, ParticipantError>;
}

/// Base addresses of the three participant services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantEndpoints {
    pub order: String,
    pub payment: String,
    pub shipping: String,
}

impl ParticipantEndpoints {
    pub fn new(
        order: impl Into<String>,
        payment: impl Into<String>,
        shipping: impl Into<String>,
    ) -> Self {
        Self {
            order: order.into(),
            payment: payment.into(),
            shipping: shipping.into(),
        }
    }

    /// Returns the base address of a participant.
    pub fn base_url(&self, participant: Participant) -> &str {
        match participant {
            Participant::Order => &self.order,
            Participant::Payment => &self.payment,
            Participant::Shipping => &self.shipping,
        }
    }

    /// Returns the full URL of a step's operation.
    pub fn url_for(&self, step: StepName) -> String {
        format!(
            "{}{}",
            self.base_url(step.participant()).trim_end_matches('/'),
            step.path()
        )
    }
}

impl Default for ParticipantEndpoints {
    fn default() -> Self {
        Self::new(
            "http://localhost:8081",
            "http://localhost:8082",
            "http://localhost:8083",
        )
    }
}

/// Checks a successful envelope carries what the saga needs from `step`.
pub(crate) fn require_identifiers(
    step: StepName,
    response: ParticipantResponse,
) -> Result<ParticipantResponse, ParticipantError> {
    if step == StepName::CreateOrder && response.order_id.as_deref().is_none_or(str::is_empty) {
        return Err(ParticipantError::MissingField("order_id"));
    }
    Ok(response)
}
