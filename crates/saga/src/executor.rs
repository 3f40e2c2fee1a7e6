//! Saga executor: forward steps and compensating steps for one transaction.

use chrono::Utc;
use common::{
    CreateOrderPayload, OrderRef, ParticipantResponse, ProcessPaymentPayload, StartSagaRequest,
    StartShippingPayload, TransactionId,
};

use crate::error::ParticipantError;
use crate::ledger::StepLedger;
use crate::participant::{self, ParticipantClient};
use crate::state::TransactionStatus;
use crate::steps::StepName;
use crate::store::TransactionStore;
use crate::transaction::StepOutcome;

/// Runs order sagas against the participants.
///
/// The forward sequence is CREATE_ORDER → PROCESS_PAYMENT → START_SHIPPING.
/// When a forward step fails, the compensations of the steps that already
/// succeeded run in reverse order, then the transaction is marked `Failed`.
/// Compensation failures are ledgered but never change the outcome.
pub struct SagaExecutor<S, C> {
    store: S,
    ledger: StepLedger<S>,
    client: C,
}

impl<S, C> SagaExecutor<S, C>
where
    S: TransactionStore + Clone,
    C: ParticipantClient,
{
    /// Creates a new executor.
    pub fn new(store: S, client: C) -> Self {
        let ledger = StepLedger::new(store.clone());
        Self {
            store,
            ledger,
            client,
        }
    }

    /// Runs the saga for a stored, pending transaction to its terminal state.
    ///
    /// Returns the status the transaction ended in.
    #[tracing::instrument(skip(self, request), fields(saga_type = "OrderSaga"))]
    pub async fn execute(
        &self,
        transaction_id: &TransactionId,
        request: &StartSagaRequest,
    ) -> TransactionStatus {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = std::time::Instant::now();

        let mut completed: Vec<StepName> = Vec::with_capacity(StepName::FORWARD.len());
        let mut order_id: Option<String> = None;

        for step in StepName::FORWARD {
            tracing::info!(step = %step, "saga step started");
            let payload = payload_for(step, request, order_id.as_deref());
            let result = self.perform(transaction_id, step, payload).await;

            match result {
                Ok(response) => {
                    if step == StepName::CreateOrder
                        && let Some(id) = response.order_id
                    {
                        self.store
                            .mutate(transaction_id, |tx| tx.set_order_id(id.clone()))
                            .await;
                        tracing::info!(order_id = %id, "order created");
                        order_id = Some(id);
                    }
                    completed.push(step);
                }
                Err(err) => {
                    tracing::warn!(step = %step, error = %err, "saga step failed");
                    self.compensate(transaction_id, request, &completed, order_id.as_deref())
                        .await;

                    let reason = match step.failure_prefix() {
                        Some(prefix) => format!("{prefix}: {err}"),
                        None => err.to_string(),
                    };
                    self.finish(transaction_id, Some(reason)).await;

                    metrics::histogram!("saga_duration_seconds")
                        .record(saga_start.elapsed().as_secs_f64());
                    metrics::counter!("saga_failed").increment(1);
                    return TransactionStatus::Failed;
                }
            }
        }

        self.finish(transaction_id, None).await;

        let duration = saga_start.elapsed().as_secs_f64();
        metrics::histogram!("saga_duration_seconds").record(duration);
        metrics::counter!("saga_completed").increment(1);
        tracing::info!(%transaction_id, duration, "saga completed successfully");

        TransactionStatus::Completed
    }

    /// Runs compensating steps in reverse order of the completed forward steps.
    ///
    /// Each compensation is best-effort: a failure is ledgered and logged and
    /// the remaining compensations still run.
    #[tracing::instrument(skip(self, request, completed))]
    async fn compensate(
        &self,
        transaction_id: &TransactionId,
        request: &StartSagaRequest,
        completed: &[StepName],
        order_id: Option<&str>,
    ) {
        for step in completed.iter().rev() {
            let Some(compensation) = step.compensation() else {
                continue;
            };
            metrics::counter!("saga_compensations_total").increment(1);

            let payload = payload_for(compensation, request, order_id);
            match self.perform(transaction_id, compensation, payload).await {
                Ok(_) => tracing::info!(step = %compensation, "compensation step completed"),
                Err(err) => {
                    metrics::counter!("saga_compensation_failures_total").increment(1);
                    tracing::warn!(
                        step = %compensation,
                        error = %err,
                        "compensation step failed, continuing"
                    );
                }
            }
        }
    }

    /// Calls one participant operation, bracketed by the step ledger.
    async fn perform(
        &self,
        transaction_id: &TransactionId,
        step: StepName,
        payload: serde_json::Result<serde_json::Value>,
    ) -> Result<ParticipantResponse, ParticipantError> {
        self.ledger.begin_step(transaction_id, step).await;
        metrics::counter!("participant_calls_total", "step" => step.as_str()).increment(1);

        let result = match payload {
            Ok(body) => self
                .client
                .call(step, body)
                .await
                .and_then(|response| participant::require_identifiers(step, response)),
            Err(e) => Err(ParticipantError::Encode(e)),
        };

        let outcome = match &result {
            Ok(_) => StepOutcome::Completed,
            Err(err) => {
                metrics::counter!("participant_call_failures_total", "step" => step.as_str())
                    .increment(1);
                StepOutcome::Failed(err.to_string())
            }
        };
        self.ledger.end_step(transaction_id, step, outcome).await;

        result
    }

    /// Moves the transaction to `Failed` if a reason is given, else `Completed`.
    async fn finish(&self, transaction_id: &TransactionId, failure_reason: Option<String>) {
        let status = match failure_reason {
            Some(_) => TransactionStatus::Failed,
            None => TransactionStatus::Completed,
        };
        let now = Utc::now();
        let result = self
            .store
            .mutate(transaction_id, |tx| match failure_reason {
                Some(reason) => tx.fail(reason, now),
                None => tx.complete(now),
            })
            .await;

        match result {
            Some(Ok(())) => tracing::info!(%transaction_id, %status, "transaction status updated"),
            Some(Err(err)) => {
                tracing::warn!(%transaction_id, error = %err, "transaction already terminal")
            }
            None => tracing::warn!(
                %transaction_id,
                "cannot update status: transaction not found"
            ),
        }
    }
}

/// Builds the request body a participant expects for `step`.
///
/// Compensations address their record by order reference only.
fn payload_for(
    step: StepName,
    request: &StartSagaRequest,
    order_id: Option<&str>,
) -> serde_json::Result<serde_json::Value> {
    let order_id = order_id.unwrap_or_default().to_string();
    match step {
        StepName::CreateOrder => serde_json::to_value(CreateOrderPayload {
            customer_id: request.customer_id.clone(),
            items: request.items.clone(),
            amount: request.amount,
        }),
        StepName::ProcessPayment => serde_json::to_value(ProcessPaymentPayload {
            order_id,
            amount: request.amount,
        }),
        StepName::StartShipping => serde_json::to_value(StartShippingPayload {
            order_id,
            address: request.address.clone(),
        }),
        StepName::CancelOrder | StepName::RefundPayment | StepName::CancelShipping => {
            serde_json::to_value(OrderRef { order_id })
        }
    }
}
