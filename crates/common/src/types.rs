use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Unique identifier for a saga transaction.
///
/// Transaction IDs have the form `TRX-<sequence>` and are opaque to callers.
/// Wrapping the string keeps them from being mixed up with the order,
/// payment and shipping references handed out by participants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Prefix used for every transaction ID.
    pub const PREFIX: &'static str = "TRX";

    /// Creates the transaction ID for the given sequence number.
    pub fn from_sequence(sequence: u64) -> Self {
        Self(format!("{}-{sequence}", Self::PREFIX))
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TransactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Monotonic generator for prefixed identifiers such as `ORD-1`, `ORD-2`.
///
/// Sequences start at 1 and are never reused within a process.
#[derive(Debug)]
pub struct IdSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl IdSequence {
    /// Creates a sequence whose first ID is `<prefix>-1`.
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    /// Returns the next raw sequence number.
    pub fn next_value(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the next prefixed ID.
    pub fn next_id(&self) -> String {
        format!("{}-{}", self.prefix, self.next_value())
    }
}
