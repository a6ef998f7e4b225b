mod models;
mod orchestrator;
mod progress;

pub use models::SyncSummary;
pub use orchestrator::{SyncConfig, SyncOrchestrator, DEFAULT_DOWNLOAD_TIMEOUT_SECS};
pub use progress::{
    LoggingProgressReporter, NoOpProgressReporter, SyncProgressPayload, SyncProgressReporter,
    SyncStatus,
};
