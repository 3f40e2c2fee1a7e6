//! Step ledger: the audit trail of attempted operations per transaction.

use chrono::Utc;
use common::TransactionId;

use crate::steps::StepName;
use crate::store::TransactionStore;
use crate::transaction::StepOutcome;

/// Records step start and end on a transaction through the store.
///
/// The ledger is observational only. A missing transaction or an unmatched
/// `end_step` is logged and otherwise ignored.
#[derive(Clone)]
pub struct StepLedger<S> {
    store: S,
}

impl<S: TransactionStore> StepLedger<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Appends a pending step stamped with the current time.
    pub async fn begin_step(&self, transaction_id: &TransactionId, name: StepName) {
        let now = Utc::now();
        let found = self
            .store
            .mutate(transaction_id, |tx| tx.begin_step(name, now))
            .await;

        match found {
            Some(()) => tracing::debug!(%transaction_id, step = %name, "step started"),
            None => tracing::warn!(
                %transaction_id,
                step = %name,
                "cannot begin step: transaction not found"
            ),
        }
    }

    /// Closes the most recent open step with this name.
    pub async fn end_step(
        &self,
        transaction_id: &TransactionId,
        name: StepName,
        outcome: StepOutcome,
    ) {
        let now = Utc::now();
        let succeeded = matches!(outcome, StepOutcome::Completed);
        let closed = self
            .store
            .mutate(transaction_id, |tx| tx.end_step(name, outcome, now))
            .await;

        match closed {
            Some(true) => {
                tracing::debug!(%transaction_id, step = %name, succeeded, "step ended")
            }
            Some(false) => tracing::debug!(
                %transaction_id,
                step = %name,
                "no open step to end"
            ),
            None => tracing::warn!(
                %transaction_id,
                step = %name,
                "cannot end step: transaction not found"
            ),
        }
    }
}
