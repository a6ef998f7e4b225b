use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{ACCOUNTS_COLLECTION, ISO_DATE_FORMAT};

pub const BALANCE_HISTORY_VERSION: u32 = 1;

/// Fields a history is looked up by.
pub const BALANCE_HISTORY_INDEX: [&str; 2] = ["year", "relationships.account.data._id"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryMetadata {
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipData {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_type")]
    pub doc_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountRelationship {
    pub data: RelationshipData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryRelationships {
    pub account: AccountRelationship,
}

/// Daily balances of one account over one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistory {
    /// Store identity; absent until first persisted.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub year: i32,
    /// ISO date to balance.
    #[serde(default)]
    pub balances: BTreeMap<String, Decimal>,
    pub metadata: BalanceHistoryMetadata,
    pub relationships: BalanceHistoryRelationships,
}

impl BalanceHistory {
    pub fn empty(account_id: impl Into<String>, year: i32) -> Self {
        Self {
            id: None,
            year,
            balances: BTreeMap::new(),
            metadata: BalanceHistoryMetadata {
                version: BALANCE_HISTORY_VERSION,
            },
            relationships: BalanceHistoryRelationships {
                account: AccountRelationship {
                    data: RelationshipData {
                        id: account_id.into(),
                        doc_type: ACCOUNTS_COLLECTION.to_string(),
                    },
                },
            },
        }
    }

    pub fn account_id(&self) -> &str {
        &self.relationships.account.data.id
    }

    /// Sets the balance for `date`, replacing any value recorded that day.
    pub fn record(&mut self, date: NaiveDate, balance: Decimal) {
        self.balances
            .insert(date.format(ISO_DATE_FORMAT).to_string(), balance);
    }

    pub fn balance_on(&self, date: NaiveDate) -> Option<Decimal> {
        self.balances
            .get(&date.format(ISO_DATE_FORMAT).to_string())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_empty_history_shape() {
        let history = BalanceHistory::empty("acc-1", 2024);
        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(
            value,
            json!({
                "year": 2024,
                "balances": {},
                "metadata": {"version": 1},
                "relationships": {"account": {"data": {"_id": "acc-1", "_type": "bank.accounts"}}}
            })
        );
    }

    #[test]
    fn test_record_overwrites_same_day() {
        let mut history = BalanceHistory::empty("acc-1", 2024);
        let day = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        history.record(day, dec!(100));
        history.record(day, dec!(120.5));

        assert_eq!(history.balances.len(), 1);
        assert_eq!(history.balance_on(day), Some(dec!(120.5)));
        assert_eq!(history.balances["2024-05-02"], dec!(120.5));
    }

    #[test]
    fn test_deserialize_stored_history() {
        let value = json!({
            "_id": "h1",
            "year": 2024,
            "balances": {"2024-01-02": 12.5},
            "metadata": {"version": 1},
            "relationships": {"account": {"data": {"_id": "acc-1", "_type": "bank.accounts"}}}
        });
        let history: BalanceHistory = serde_json::from_value(value).unwrap();
        assert_eq!(history.id.as_deref(), Some("h1"));
        assert_eq!(history.account_id(), "acc-1");
        assert_eq!(history.balances["2024-01-02"], dec!(12.5));
    }
}
