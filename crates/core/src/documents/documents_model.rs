use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// A downloadable statement, as listed on an account's statement page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementDocument {
    pub fileurl: String,
    pub filename: String,
}

/// Outcome of one [`FileSaver`](super::FileSaver) call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveReport {
    /// Filenames written during this call.
    pub saved: Vec<String>,
    /// Filenames already present, not downloaded again.
    pub skipped: Vec<String>,
    /// Filenames whose download or write failed; the batch went on without them.
    pub failed: Vec<String>,
    /// True when the deadline stopped the batch early.
    pub truncated: bool,
}

impl SaveReport {
    /// Documents accounted for, saved or already present.
    pub fn handled(&self) -> usize {
        self.saved.len() + self.skipped.len()
    }

    /// Degraded-error view of a truncated batch; `None` when it completed.
    pub fn truncation(&self, account: &str, total: usize) -> Option<Error> {
        self.truncated.then(|| Error::TimeoutTruncation {
            account: account.to_string(),
            saved: self.handled(),
            total,
        })
    }
}
