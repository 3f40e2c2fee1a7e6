//! HTTP participant client.

use async_trait::async_trait;
use common::ParticipantResponse;

use super::{ParticipantClient, ParticipantEndpoints};
use crate::error::ParticipantError;
use crate::steps::StepName;

/// Calls participants with `POST <base><path>` and a JSON body.
///
/// The envelope is parsed whatever the HTTP status: participants answer a
/// declined operation with a 4xx and a `success: false` envelope.
#[derive(Debug, Clone)]
pub struct HttpParticipantClient {
    endpoints: ParticipantEndpoints,
    client: reqwest::Client,
}

impl HttpParticipantClient {
    pub fn new(endpoints: ParticipantEndpoints) -> Self {
        Self {
            endpoints,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl ParticipantClient for HttpParticipantClient {
    #[tracing::instrument(skip(self, payload), fields(participant = %step.participant()))]
    async fn call(
        &self,
        step: StepName,
        payload: serde_json::Value,
    ) -> Result<ParticipantResponse, ParticipantError> {
        let url = self.endpoints.url_for(step);

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| ParticipantError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ParticipantError::Transport(e.to_string()))?;

        let envelope: ParticipantResponse =
            serde_json::from_str(&body).map_err(|_| ParticipantError::MalformedResponse {
                status,
                body: body.trim().to_string(),
            })?;

        if !envelope.success {
            tracing::debug!(status, message = %envelope.message, "participant rejected call");
            return Err(ParticipantError::Rejected(envelope.message));
        }

        Ok(envelope)
    }
}
