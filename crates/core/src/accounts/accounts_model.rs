//! Account domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accounts_constants::{account_type_for_label, INSTITUTION_LABEL};

/// Kind of account, as far as the portal label tells us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Bank,
    /// Label not in the classification table yet.
    Unknown,
}

/// A bank account as listed on the portal's account summary page.
///
/// The account number is the identity used for upserts; re-running the
/// pipeline only refreshes the balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub institution_label: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub label: String,
    pub number: String,
    pub balance: Decimal,
    /// Opaque token from the row's export link, used to build the
    /// transaction export URL.
    pub link_operations: String,
}

impl Account {
    /// Builds an account from the scraped cells, classifying the label.
    pub fn new(
        label: impl Into<String>,
        number: impl Into<String>,
        balance: Decimal,
        link_operations: impl Into<String>,
    ) -> Self {
        let label = label.into();
        Self {
            institution_label: INSTITUTION_LABEL.to_string(),
            account_type: account_type_for_label(&label),
            label,
            number: number.into(),
            balance,
            link_operations: link_operations.into(),
        }
    }
}
