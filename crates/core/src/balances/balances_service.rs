use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use futures::future::try_join_all;
use log::{debug, info};
use serde_json::json;

use super::balances_model::{BalanceHistory, BALANCE_HISTORY_INDEX};
use crate::accounts::Account;
use crate::constants::{BALANCE_HISTORIES_COLLECTION, ID_FIELD};
use crate::store::{decode_records, encode_records, selector, DocumentStore, Stored};
use crate::Result;

/// Merges each account's current balance into its yearly history.
pub struct BalanceHistoryService {
    store: Arc<dyn DocumentStore>,
}

impl BalanceHistoryService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the stored history for `(account, year)` or a fresh one.
    pub async fn find_or_create(&self, account_id: &str, year: i32) -> Result<BalanceHistory> {
        let query = selector([
            (BALANCE_HISTORY_INDEX[0], json!(year)),
            (BALANCE_HISTORY_INDEX[1], json!(account_id)),
        ]);
        let found = self
            .store
            .indexed_query(BALANCE_HISTORIES_COLLECTION, &BALANCE_HISTORY_INDEX, &query, 1)
            .await?;

        match decode_records::<BalanceHistory>(found)?.into_iter().next() {
            Some(history) => Ok(history),
            None => {
                debug!("No {} balance history for account {}", year, account_id);
                Ok(BalanceHistory::empty(account_id, year))
            }
        }
    }

    /// Records `today`'s balance for every account and upserts the histories.
    ///
    /// Lookups run concurrently; the write is a single upsert keyed on `_id`.
    pub async fn accumulate(
        &self,
        accounts: &[Stored<Account>],
        today: NaiveDate,
    ) -> Result<Vec<BalanceHistory>> {
        let year = today.year();
        let lookups = accounts.iter().map(|account| async move {
            let mut history = self.find_or_create(&account.id, year).await?;
            history.record(today, account.record.balance);
            Ok::<_, crate::Error>(history)
        });
        let histories = try_join_all(lookups).await?;

        let stored = self
            .store
            .upsert(
                BALANCE_HISTORIES_COLLECTION,
                encode_records(&histories)?,
                &[ID_FIELD],
            )
            .await?;
        info!("Upserted {} balance histories for {}", stored.len(), today);
        decode_records(stored)
    }
}
