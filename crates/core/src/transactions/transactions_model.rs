//! Transaction domain model.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CURRENCY;

/// Operation type until labels get classified.
pub const UNCLASSIFIED_TYPE: &str = "none";

/// One line of an account's operations export.
///
/// Transactions have no natural key: they are appended, and only the
/// `SkipDuplicates` policy fills `fingerprint` to merge re-imported rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub date: NaiveDate,
    pub label: String,
    /// Every label part of the export cell, joined by newlines.
    pub original_label: String,
    #[serde(rename = "type")]
    pub transaction_type: String,
    pub date_import: DateTime<Utc>,
    pub date_operation: NaiveDate,
    pub currency: String,
    /// Signed amount, debits negative.
    pub amount: Decimal,
    /// Store id of the owning account.
    pub account: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl Transaction {
    /// Builds an unclassified EUR transaction from the label parts of a row.
    ///
    /// `labels` must hold at least the primary label; an empty slice yields
    /// an empty label.
    pub fn from_labels(
        labels: &[String],
        date: NaiveDate,
        amount: Decimal,
        account: impl Into<String>,
        date_import: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            label: labels.first().cloned().unwrap_or_default(),
            original_label: labels.join("\n"),
            transaction_type: UNCLASSIFIED_TYPE.to_string(),
            date_import,
            date_operation: date,
            currency: DEFAULT_CURRENCY.to_string(),
            amount,
            account: account.into(),
            fingerprint: None,
        }
    }
}
