//! Pipeline orchestrator.
//!
//! One run goes: region lookup, login, accounts, per-account operations,
//! balance histories, then statement downloads under a shrinking deadline.
//! Every error is classified by [`Error::severity`]: fatal ones abort the run
//! at once, degraded ones are logged and counted in the [`SyncSummary`].

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use super::models::SyncSummary;
use super::progress::{SyncProgressPayload, SyncProgressReporter, SyncStatus};
use crate::files::DirectoryFileSaver;
use bankfetch_core::accounts::ACCOUNT_UNIQUE_KEY;
use bankfetch_core::constants::{ACCOUNTS_COLLECTION, OPERATIONS_COLLECTION};
use bankfetch_core::errors::Severity;
use bankfetch_core::store::{decode_records, encode_records};
use bankfetch_core::transactions::FINGERPRINT_FIELD;
use bankfetch_core::{
    Account, BalanceHistoryService, DocumentStore, DownloadBudget, Error, FileSaver, Result,
    StatementDocument, Stored, TransactionPolicy,
};
use bankfetch_portal::client::DEFAULT_TIMEOUT_SECS;
use bankfetch_portal::extract::{
    fetch_statement_accounts, fetch_statement_documents, fetch_transactions, local_today,
    parse_accounts, ExtractedTransactions,
};
use bankfetch_portal::{
    AuthenticatedSession, Credentials, LoginFlow, MarkupPatterns, RegionTable, SessionClient,
};

/// Default wall-clock window for every statement download of a run.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 240;

/// Logs a degraded error and lets the run go on; a fatal one is returned.
fn tolerate(error: Error) -> Result<()> {
    match error.severity() {
        Severity::Degraded => {
            warn!("{}", error);
            Ok(())
        }
        Severity::Fatal => Err(error),
    }
}

/// Configuration for pipeline runs.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Budget shared by all statement downloads, starting with the run.
    pub download_timeout: Duration,
    /// Timeout of each portal request.
    pub http_timeout: Duration,
    pub transaction_policy: TransactionPolicy,
    /// Directory receiving statement PDFs.
    pub files_dir: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            download_timeout: Duration::from_secs(DEFAULT_DOWNLOAD_TIMEOUT_SECS),
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            transaction_policy: TransactionPolicy::default(),
            files_dir: PathBuf::from("./statements"),
        }
    }
}

/// Runs the whole pipeline for one bank login.
///
/// # Example
///
/// ```ignore
/// let orchestrator = SyncOrchestrator::new(
///     store,
///     Arc::new(LoggingProgressReporter),
///     Arc::new(DefaultMarkupPatterns),
///     SyncConfig::default(),
/// );
/// let summary = orchestrator.run(&regions, "paris", credentials).await?;
/// ```
pub struct SyncOrchestrator<P: SyncProgressReporter> {
    store: Arc<dyn DocumentStore>,
    progress_reporter: Arc<P>,
    patterns: Arc<dyn MarkupPatterns>,
    config: SyncConfig,
    /// Replaces the session-backed directory saver when set.
    file_saver: Option<Arc<dyn FileSaver>>,
}

impl<P: SyncProgressReporter> SyncOrchestrator<P> {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        progress_reporter: Arc<P>,
        patterns: Arc<dyn MarkupPatterns>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            progress_reporter,
            patterns,
            config,
            file_saver: None,
        }
    }

    pub fn with_file_saver(mut self, file_saver: Arc<dyn FileSaver>) -> Self {
        self.file_saver = Some(file_saver);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Runs the pipeline. The download deadline starts now.
    ///
    /// Always emits the start event and either the complete or the failed
    /// event.
    pub async fn run(
        &self,
        regions: &RegionTable,
        bank_id: &str,
        credentials: Credentials,
    ) -> Result<SyncSummary> {
        let budget = DownloadBudget::starting_now(self.config.download_timeout);
        self.run_with_budget(regions, bank_id, credentials, budget)
            .await
    }

    /// Same as [`run`](Self::run) with a deadline fixed by the caller.
    pub async fn run_with_budget(
        &self,
        regions: &RegionTable,
        bank_id: &str,
        credentials: Credentials,
        budget: DownloadBudget,
    ) -> Result<SyncSummary> {
        self.progress_reporter.report_sync_start();

        let result = self
            .run_internal(regions, bank_id, credentials, budget)
            .await;
        match &result {
            Ok(summary) => self.progress_reporter.report_sync_complete(summary),
            Err(err) => self.progress_reporter.report_sync_failed(err),
        }
        result
    }

    async fn run_internal(
        &self,
        regions: &RegionTable,
        bank_id: &str,
        credentials: Credentials,
        budget: DownloadBudget,
    ) -> Result<SyncSummary> {
        let bank_url = regions.resolve(bank_id)?.to_string();

        self.progress_reporter
            .report_progress(SyncProgressPayload::new(SyncStatus::LoggingIn));
        let client = SessionClient::new(self.config.http_timeout)?;
        let session = LoginFlow::new(client, self.patterns.clone(), credentials)
            .run(&bank_url)
            .await?;

        let mut summary = SyncSummary::default();

        let accounts = self.sync_accounts(&session).await?;
        summary.accounts_upserted = accounts.len();

        self.sync_transactions(&session, &accounts, &mut summary)
            .await?;

        self.progress_reporter
            .report_progress(SyncProgressPayload::new(SyncStatus::Balances));
        let histories = BalanceHistoryService::new(self.store.clone())
            .accumulate(&accounts, local_today())
            .await?;
        summary.balance_histories_upserted = histories.len();

        self.sync_statements(&session, budget, &mut summary).await?;

        Ok(summary)
    }

    /// Parses the account page of the session and upserts on the number.
    async fn sync_accounts(&self, session: &AuthenticatedSession) -> Result<Vec<Stored<Account>>> {
        let accounts = parse_accounts(&session.accounts_page.html(), self.patterns.as_ref())?;
        info!("Found {} accounts", accounts.len());

        let stored = self
            .store
            .upsert(
                ACCOUNTS_COLLECTION,
                encode_records(&accounts)?,
                &[ACCOUNT_UNIQUE_KEY],
            )
            .await?;
        let stored: Vec<Stored<Account>> = decode_records(stored)?;

        self.progress_reporter.report_progress(
            SyncProgressPayload::new(SyncStatus::Accounts)
                .with_processed(stored.len())
                .with_message(format!("{} accounts upserted", stored.len())),
        );
        Ok(stored)
    }

    /// Fetches and persists operations one account after the other.
    async fn sync_transactions(
        &self,
        session: &AuthenticatedSession,
        accounts: &[Stored<Account>],
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let policy = self.config.transaction_policy;
        debug!("Persisting operations with policy {}", policy);

        for account in accounts {
            let ExtractedTransactions {
                transactions,
                issues,
            } = fetch_transactions(session, account).await?;
            let degraded = issues.len();
            for issue in issues {
                tolerate(issue.into())?;
                summary.data_quality_issues += 1;
            }

            let batch = policy.prepare(transactions);
            let persisted = if batch.is_empty() {
                0
            } else {
                let records = encode_records(&batch)?;
                let stored = match policy {
                    TransactionPolicy::AppendAll => {
                        self.store.append(OPERATIONS_COLLECTION, records).await?
                    }
                    TransactionPolicy::SkipDuplicates => {
                        self.store
                            .upsert(OPERATIONS_COLLECTION, records, &[FINGERPRINT_FIELD])
                            .await?
                    }
                };
                stored.len()
            };
            summary.transactions_persisted += persisted;

            let mut payload = SyncProgressPayload::new(SyncStatus::Transactions)
                .with_account(&account.record.label)
                .with_processed(persisted);
            if degraded > 0 {
                payload = payload.with_message(format!("{} rows degraded", degraded));
            }
            self.progress_reporter.report_progress(payload);
        }
        Ok(())
    }

    /// Lists statements per account and saves them, each account within its
    /// share of what is left of `budget`.
    async fn sync_statements(
        &self,
        session: &AuthenticatedSession,
        budget: DownloadBudget,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let statement_accounts = fetch_statement_accounts(session).await?;
        if statement_accounts.is_empty() {
            info!("No statement accounts listed");
            return Ok(());
        }

        let saver: Arc<dyn FileSaver> = match &self.file_saver {
            Some(saver) => saver.clone(),
            None => Arc::new(DirectoryFileSaver::new(
                session.client.clone(),
                self.config.files_dir.clone(),
            )),
        };

        let total = statement_accounts.len();
        for (position, account) in statement_accounts.iter().enumerate() {
            let documents =
                fetch_statement_documents(session, account, self.patterns.as_ref()).await?;
            self.save_account_statements(
                saver.as_ref(),
                &budget,
                (position, total),
                &account.label,
                documents,
                summary,
            )
            .await?;
        }
        Ok(())
    }

    /// Saves the statements of account `index` (0-based) out of `total`,
    /// within its share of what is left of `budget`.
    async fn save_account_statements(
        &self,
        saver: &dyn FileSaver,
        budget: &DownloadBudget,
        (index, total): (usize, usize),
        label: &str,
        documents: Vec<StatementDocument>,
        summary: &mut SyncSummary,
    ) -> Result<()> {
        let listed = documents.len();
        let deadline = budget.slice_for(index, total);

        let report = saver.save_files(documents, deadline).await?;
        summary.documents_saved += report.saved.len();
        summary.documents_skipped += report.skipped.len();
        summary.failed_documents.extend(report.failed.iter().cloned());

        match report.truncation(label, listed) {
            Some(truncation) => {
                let message = truncation.to_string();
                tolerate(truncation)?;
                summary.truncated_accounts.push(label.to_string());
                self.progress_reporter.report_progress(
                    SyncProgressPayload::new(SyncStatus::Truncated)
                        .with_account(label)
                        .with_processed(report.handled())
                        .with_message(message),
                );
            }
            None => self.progress_reporter.report_progress(
                SyncProgressPayload::new(SyncStatus::Statements)
                    .with_account(label)
                    .with_processed(report.handled()),
            ),
        }
        Ok(())
    }
}
