//! bankfetch core - domain entities, services, and traits.
//!
//! This crate holds the records scraped from the bank portal and the
//! contracts of the collaborators that receive them. It is storage-agnostic:
//! the document store and the file saver are traits implemented elsewhere
//! (`storage-sqlite`, `connect`).

pub mod accounts;
pub mod balances;
pub mod constants;
pub mod documents;
pub mod errors;
pub mod store;
pub mod transactions;

pub use accounts::{Account, AccountType};
pub use balances::{BalanceHistory, BalanceHistoryService};
pub use documents::{DownloadBudget, FileSaver, SaveReport, StatementDocument};
pub use store::{DocumentStore, MemoryDocumentStore, Selector, Stored};
pub use transactions::{Transaction, TransactionPolicy};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
