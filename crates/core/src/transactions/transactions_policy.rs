//! Persistence policy for scraped transactions.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::transactions_fingerprint::{compute_fingerprint, content_key};
use super::transactions_model::Transaction;
use crate::errors::Error;

/// Store field holding the fingerprint under [`TransactionPolicy::SkipDuplicates`].
pub const FINGERPRINT_FIELD: &str = "fingerprint";

/// How a batch of transactions reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionPolicy {
    /// Append every row; re-running the pipeline may store duplicates.
    #[default]
    AppendAll,
    /// Fingerprint every row and upsert on the fingerprint.
    SkipDuplicates,
}

impl TransactionPolicy {
    /// Prepares a batch for this policy: fingerprints are only computed when
    /// they are used as the upsert key.
    ///
    /// The batch must be one whole export in portal order, so that the n-th
    /// of several identical rows gets the same fingerprint on every run.
    pub fn prepare(&self, mut batch: Vec<Transaction>) -> Vec<Transaction> {
        if *self == TransactionPolicy::SkipDuplicates {
            let mut seen: HashMap<String, usize> = HashMap::new();
            for transaction in &mut batch {
                let occurrence = seen.entry(content_key(transaction)).or_insert(0);
                transaction.fingerprint = Some(compute_fingerprint(transaction, *occurrence));
                *occurrence += 1;
            }
        }
        batch
    }
}

impl fmt::Display for TransactionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionPolicy::AppendAll => write!(f, "append"),
            TransactionPolicy::SkipDuplicates => write!(f, "skip-duplicates"),
        }
    }
}

impl FromStr for TransactionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" | "append-all" => Ok(TransactionPolicy::AppendAll),
            "skip-duplicates" | "dedup" => Ok(TransactionPolicy::SkipDuplicates),
            other => Err(Error::InvalidConfigValue(format!(
                "unknown transaction policy '{}', expected 'append' or 'skip-duplicates'",
                other
            ))),
        }
    }
}
