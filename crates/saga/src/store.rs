//! Transaction store trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{IdSequence, TransactionId};
use tokio::sync::RwLock;

use crate::error::{Result, SagaError};
use crate::transaction::Transaction;

/// Keyed container of transaction records.
///
/// Callers only ever see full snapshots: `get` hands out a copy and every
/// write goes through `mutate`, which runs the update as one
/// read-modify-write critical section. Implementations must never hold
/// their lock across an outbound call.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Allocates the next unused transaction ID.
    async fn next_id(&self) -> TransactionId;

    /// Inserts a new transaction and returns the stored snapshot.
    ///
    /// Fails with `DuplicateTransaction` if the ID is already present.
    async fn create(&self, transaction: Transaction) -> Result<Transaction>;

    /// Returns a snapshot of the transaction.
    async fn get(&self, id: &TransactionId) -> Result<Transaction>;

    /// Applies `f` to the stored transaction and returns its result.
    ///
    /// Returns `None` without calling `f` if the ID is unknown.
    async fn mutate<F, R>(&self, id: &TransactionId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Transaction) -> R + Send,
        R: Send;
}

/// In-memory transaction store guarded by a single lock.
///
/// Records are retained for the life of the process.
#[derive(Clone)]
pub struct InMemoryTransactionStore {
    transactions: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
    ids: Arc<IdSequence>,
}

impl InMemoryTransactionStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            transactions: Arc::new(RwLock::new(HashMap::new())),
            ids: Arc::new(IdSequence::new(TransactionId::PREFIX)),
        }
    }

    /// Returns the number of stored transactions.
    pub async fn len(&self) -> usize {
        self.transactions.read().await.len()
    }

    /// Returns true if no transactions are stored.
    pub async fn is_empty(&self) -> bool {
        self.transactions.read().await.is_empty()
    }
}

impl Default for InMemoryTransactionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionStore for InMemoryTransactionStore {
    async fn next_id(&self) -> TransactionId {
        TransactionId::from_sequence(self.ids.next_value())
    }

    async fn create(&self, transaction: Transaction) -> Result<Transaction> {
        let mut transactions = self.transactions.write().await;
        let id = transaction.id().clone();
        if transactions.contains_key(&id) {
            return Err(SagaError::DuplicateTransaction(id));
        }
        transactions.insert(id, transaction.clone());
        Ok(transaction)
    }

    async fn get(&self, id: &TransactionId) -> Result<Transaction> {
        self.transactions
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| SagaError::TransactionNotFound(id.clone()))
    }

    async fn mutate<F, R>(&self, id: &TransactionId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Transaction) -> R + Send,
        R: Send,
    {
        let mut transactions = self.transactions.write().await;
        transactions.get_mut(id).map(f)
    }
}
