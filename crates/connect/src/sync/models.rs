use serde::{Deserialize, Serialize};

/// Counters of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSummary {
    pub accounts_upserted: usize,
    pub transactions_persisted: usize,
    pub balance_histories_upserted: usize,
    pub documents_saved: usize,
    /// Documents already present in the files directory.
    pub documents_skipped: usize,
    /// Statements whose download or write failed.
    pub failed_documents: Vec<String>,
    /// Export rows that were degraded or dropped.
    pub data_quality_issues: usize,
    /// Statement labels whose download window closed early.
    pub truncated_accounts: Vec<String>,
}

impl SyncSummary {
    /// True when nothing was degraded.
    pub fn is_clean(&self) -> bool {
        self.data_quality_issues == 0
            && self.truncated_accounts.is_empty()
            && self.failed_documents.is_empty()
    }

    pub fn message(&self) -> String {
        let mut message = format!(
            "Sync completed. {} accounts, {} operations, {} balance histories, {} documents saved ({} already present)",
            self.accounts_upserted,
            self.transactions_persisted,
            self.balance_histories_upserted,
            self.documents_saved,
            self.documents_skipped
        );
        if self.data_quality_issues > 0 {
            message.push_str(&format!(", {} row issues", self.data_quality_issues));
        }
        if !self.failed_documents.is_empty() {
            message.push_str(&format!(", {} documents failed", self.failed_documents.len()));
        }
        if !self.truncated_accounts.is_empty() {
            message.push_str(&format!(
                ", truncated: {}",
                self.truncated_accounts.join(", ")
            ));
        }
        message.push('.');
        message
    }
}
