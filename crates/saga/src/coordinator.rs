//! Saga coordinator: the entry point for starting sagas and querying them.

use std::sync::Arc;

use chrono::Utc;
use common::{StartSagaRequest, TransactionId};

use crate::error::{Result, SagaError};
use crate::executor::SagaExecutor;
use crate::participant::ParticipantClient;
use crate::store::TransactionStore;
use crate::transaction::Transaction;

/// Accepts saga start requests and status queries.
///
/// `start` records a pending transaction, hands it to the executor on its
/// own task, and returns without waiting. Progress is observed only by
/// polling `status`.
pub struct SagaCoordinator<S, C> {
    store: S,
    executor: Arc<SagaExecutor<S, C>>,
}

impl<S, C> Clone for SagaCoordinator<S, C>
where
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            executor: Arc::clone(&self.executor),
        }
    }
}

impl<S, C> SagaCoordinator<S, C>
where
    S: TransactionStore + Clone + 'static,
    C: ParticipantClient + 'static,
{
    /// Creates a new coordinator.
    pub fn new(store: S, client: C) -> Self {
        let executor = Arc::new(SagaExecutor::new(store.clone(), client));
        Self { store, executor }
    }

    /// Validates the request, records a pending transaction and spawns its saga.
    ///
    /// Returns the initial snapshot, which is always `Pending`.
    #[tracing::instrument(skip(self, request), fields(customer_id = %request.customer_id))]
    pub async fn start(&self, request: StartSagaRequest) -> Result<Transaction> {
        validate(&request)?;

        let id = self.store.next_id().await;
        let transaction = self
            .store
            .create(Transaction::new(id.clone(), &request, Utc::now()))
            .await?;

        let executor = Arc::clone(&self.executor);
        tokio::spawn(async move {
            executor.execute(&id, &request).await;
        });

        tracing::info!(transaction_id = %transaction.id(), "transaction initiated");
        Ok(transaction)
    }

    /// Returns the current snapshot of a transaction.
    pub async fn status(&self, id: &TransactionId) -> Result<Transaction> {
        self.store.get(id).await
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Rejects requests that must not create a transaction.
pub fn validate(request: &StartSagaRequest) -> Result<()> {
    if request.customer_id.is_empty() {
        return Err(SagaError::Validation("Customer ID is required".to_string()));
    }
    if !request.amount.is_finite() || request.amount <= 0.0 {
        return Err(SagaError::Validation(
            "Amount must be greater than zero".to_string(),
        ));
    }
    if request.address.is_empty() {
        return Err(SagaError::Validation(
            "Shipping address is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use common::ParticipantResponse;
    use tokio::sync::Notify;

    use super::*;
    use crate::error::ParticipantError;
    use crate::participant::InMemoryParticipantClient;
    use crate::state::{StepStatus, TransactionStatus};
    use crate::steps::StepName;
    use crate::store::InMemoryTransactionStore;

    type TestCoordinator = SagaCoordinator<InMemoryTransactionStore, InMemoryParticipantClient>;

    fn setup() -> (TestCoordinator, InMemoryParticipantClient) {
        let client = InMemoryParticipantClient::new();
        let coordinator = SagaCoordinator::new(InMemoryTransactionStore::new(), client.clone());
        (coordinator, client)
    }

    fn request() -> StartSagaRequest {
        StartSagaRequest {
            customer_id: "CUST-1".to_string(),
            items: Vec::new(),
            amount: 42.0,
            address: "1 Main St".to_string(),
        }
    }

    async fn wait_for_terminal<C>(
        coordinator: &SagaCoordinator<InMemoryTransactionStore, C>,
        id: &TransactionId,
    ) -> Transaction
    where
        C: ParticipantClient + 'static,
    {
        for _ in 0..200 {
            let tx = coordinator.status(id).await.unwrap();
            if tx.status().is_terminal() {
                return tx;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("transaction {id} did not reach a terminal state");
    }

    #[tokio::test]
    async fn test_start_returns_pending_snapshot() {
        let (coordinator, _) = setup();

        let tx = coordinator.start(request()).await.unwrap();
        assert_eq!(tx.status(), TransactionStatus::Pending);
        assert_eq!(tx.id().as_str(), "TRX-1");
        assert!(tx.steps().is_empty());
        assert!(tx.completed_at().is_none());
    }

    #[tokio::test]
    async fn test_saga_runs_in_background() {
        let (coordinator, _) = setup();

        let tx = coordinator.start(request()).await.unwrap();
        let done = wait_for_terminal(&coordinator, tx.id()).await;

        assert_eq!(done.status(), TransactionStatus::Completed);
        assert_eq!(done.steps().len(), 3);
        assert_eq!(done.created_at(), tx.created_at());
    }

    #[tokio::test]
    async fn test_failed_saga_reports_reason() {
        let (coordinator, client) = setup();
        client.set_fail_on(StepName::ProcessPayment, true);

        let tx = coordinator.start(request()).await.unwrap();
        let done = wait_for_terminal(&coordinator, tx.id()).await;

        assert_eq!(done.status(), TransactionStatus::Failed);
        assert!(
            done.failure_reason()
                .unwrap()
                .starts_with("Failed to process payment")
        );
    }

    #[tokio::test]
    async fn test_validation_rejects_before_creating() {
        let (coordinator, client) = setup();

        let mut bad = request();
        bad.customer_id = String::new();
        let err = coordinator.start(bad).await.unwrap_err();
        assert_eq!(err.to_string(), "Customer ID is required");

        let mut bad = request();
        bad.amount = 0.0;
        let err = coordinator.start(bad).await.unwrap_err();
        assert_eq!(err.to_string(), "Amount must be greater than zero");

        let mut bad = request();
        bad.amount = -5.0;
        assert!(matches!(
            coordinator.start(bad).await,
            Err(SagaError::Validation(_))
        ));

        let mut bad = request();
        bad.address = String::new();
        let err = coordinator.start(bad).await.unwrap_err();
        assert_eq!(err.to_string(), "Shipping address is required");

        assert!(coordinator.store().is_empty().await);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_transaction() {
        let (coordinator, _) = setup();
        let result = coordinator.status(&TransactionId::from("TRX-77")).await;
        assert!(matches!(result, Err(SagaError::TransactionNotFound(_))));
    }

    #[tokio::test]
    async fn test_terminal_snapshot_is_stable() {
        let (coordinator, _) = setup();
        let tx = coordinator.start(request()).await.unwrap();
        let first = wait_for_terminal(&coordinator, tx.id()).await;

        for _ in 0..5 {
            assert_eq!(coordinator.status(tx.id()).await.unwrap(), first);
        }
    }

    #[tokio::test]
    async fn test_whitespace_fields_are_not_empty() {
        let (coordinator, _) = setup();

        let mut req = request();
        req.customer_id = "   ".to_string();
        req.address = " ".to_string();
        let tx = coordinator.start(req).await.unwrap();
        assert_eq!(tx.customer_id(), "   ");

        let done = wait_for_terminal(&coordinator, tx.id()).await;
        assert_eq!(done.status(), TransactionStatus::Completed);
    }

    /// Holds calls to one step until released.
    struct GatedClient {
        inner: InMemoryParticipantClient,
        gate: StepName,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl ParticipantClient for GatedClient {
        async fn call(
            &self,
            step: StepName,
            payload: serde_json::Value,
        ) -> std::result::Result<ParticipantResponse, ParticipantError> {
            if step == self.gate {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.call(step, payload).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_status_during_participant_call() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let coordinator = SagaCoordinator::new(
            InMemoryTransactionStore::new(),
            GatedClient {
                inner: InMemoryParticipantClient::new(),
                gate: StepName::ProcessPayment,
                entered: Arc::clone(&entered),
                release: Arc::clone(&release),
            },
        );

        let tx = coordinator.start(request()).await.unwrap();
        tokio::time::timeout(Duration::from_secs(5), entered.notified())
            .await
            .expect("payment step was never called");

        let query = coordinator.status(tx.id());
        let snapshot = tokio::time::timeout(Duration::from_millis(200), query)
            .await
            .expect("status query blocked by an in-flight call")
            .unwrap();
        assert_eq!(snapshot.status(), TransactionStatus::Pending);
        assert_eq!(
            snapshot.step_summary(),
            vec![
                (StepName::CreateOrder, StepStatus::Completed),
                (StepName::ProcessPayment, StepStatus::Pending),
            ]
        );
        assert!(snapshot.steps().last().unwrap().is_open());
        assert_eq!(snapshot.order_id(), Some("ORD-1"));

        release.notify_one();
        let done = wait_for_terminal(&coordinator, tx.id()).await;
        assert_eq!(done.status(), TransactionStatus::Completed);
    }
}
