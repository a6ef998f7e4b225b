//! Transactions module - scraped account operations and how they are persisted.

mod transactions_fingerprint;
mod transactions_model;
mod transactions_policy;

pub use transactions_fingerprint::compute_fingerprint;
pub use transactions_model::{Transaction, UNCLASSIFIED_TYPE};
pub use transactions_policy::{TransactionPolicy, FINGERPRINT_FIELD};
