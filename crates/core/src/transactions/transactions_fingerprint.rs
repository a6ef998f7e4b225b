//! Content fingerprint for transactions.
//!
//! The export carries no row identifier, so the fingerprint hashes what a
//! human would use to recognise the same operation twice. Identical rows in
//! one export (two coffees at the same price on the same day) are told apart
//! by their occurrence rank within the export.

use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use super::transactions_model::Transaction;

/// Computes a SHA-256 hex fingerprint of account, date, amount, the full
/// label and `occurrence`, the 0-based rank of this row among identical rows
/// of the same export. Import time is left out so re-runs produce the same
/// value.
pub fn compute_fingerprint(transaction: &Transaction, occurrence: usize) -> String {
    let mut hasher = Sha256::new();

    hasher.update(content_key(transaction).as_bytes());
    hasher.update(b"|");
    hasher.update(occurrence.to_string().as_bytes());

    hex::encode(hasher.finalize())
}

/// Normalized `account|date|amount|label` key; rows sharing it are
/// indistinguishable in the export.
pub(crate) fn content_key(transaction: &Transaction) -> String {
    format!(
        "{}|{}|{}|{}",
        transaction.account,
        transaction.date.format("%Y-%m-%d"),
        normalize_decimal(transaction.amount),
        normalize_label(&transaction.original_label)
    )
}

fn normalize_decimal(d: Decimal) -> String {
    d.normalize().to_string()
}

fn normalize_label(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
