//! bankfetch connect - runs the portal pipeline end to end.
//!
//! The orchestrator drives the portal crate (login, extraction) and hands
//! results to the collaborators defined in `bankfetch-core`: the document
//! store and the file saver.

pub mod files;
pub mod sync;

pub use files::DirectoryFileSaver;
pub use sync::{
    LoggingProgressReporter, NoOpProgressReporter, SyncConfig, SyncOrchestrator,
    SyncProgressPayload, SyncProgressReporter, SyncStatus, SyncSummary,
};
