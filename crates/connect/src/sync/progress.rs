//! Progress reporting for pipeline runs.
//!
//! The orchestrator emits events through [`SyncProgressReporter`] so the
//! binary (or any other host) decides where they go.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::models::SyncSummary;
use bankfetch_core::Error;

/// Stage of the run an event belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    LoggingIn,
    Accounts,
    Transactions,
    Balances,
    Statements,
    /// A statement download window closed early.
    Truncated,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::LoggingIn => write!(f, "logging_in"),
            SyncStatus::Accounts => write!(f, "accounts"),
            SyncStatus::Transactions => write!(f, "transactions"),
            SyncStatus::Balances => write!(f, "balances"),
            SyncStatus::Statements => write!(f, "statements"),
            SyncStatus::Truncated => write!(f, "truncated"),
        }
    }
}

/// Payload for progress events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncProgressPayload {
    pub status: SyncStatus,
    /// Account label, when the event concerns one account.
    pub account: Option<String>,
    /// Items handled so far in this stage (operations, documents).
    pub processed: usize,
    pub message: Option<String>,
}

impl SyncProgressPayload {
    pub fn new(status: SyncStatus) -> Self {
        Self {
            status,
            account: None,
            processed: 0,
            message: None,
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn with_processed(mut self, count: usize) -> Self {
        self.processed = count;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Receives progress events of a run.
pub trait SyncProgressReporter: Send + Sync {
    fn report_progress(&self, payload: SyncProgressPayload);

    fn report_sync_start(&self);

    fn report_sync_complete(&self, summary: &SyncSummary);

    fn report_sync_failed(&self, error: &Error);
}

/// A no-op progress reporter for contexts where progress reporting is not needed.
#[derive(Debug, Clone, Default)]
pub struct NoOpProgressReporter;

impl SyncProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _payload: SyncProgressPayload) {}

    fn report_sync_start(&self) {}

    fn report_sync_complete(&self, _summary: &SyncSummary) {}

    fn report_sync_failed(&self, _error: &Error) {}
}

/// Writes every event to the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingProgressReporter;

impl SyncProgressReporter for LoggingProgressReporter {
    fn report_progress(&self, payload: SyncProgressPayload) {
        let account = payload.account.as_deref().unwrap_or("-");
        let message = payload.message.as_deref().unwrap_or("");
        match payload.status {
            SyncStatus::Truncated => warn!(
                "[{}] {} ({} processed) {}",
                payload.status, account, payload.processed, message
            ),
            _ => info!(
                "[{}] {} ({} processed) {}",
                payload.status, account, payload.processed, message
            ),
        }
    }

    fn report_sync_start(&self) {
        info!("Starting bank sync");
    }

    fn report_sync_complete(&self, summary: &SyncSummary) {
        info!("{}", summary.message());
    }

    fn report_sync_failed(&self, error: &Error) {
        warn!("Sync failed ({}): {}", error.boundary_code(), error);
    }
}
