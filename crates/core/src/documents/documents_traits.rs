use async_trait::async_trait;
use tokio::time::Instant;

use super::documents_model::{SaveReport, StatementDocument};
use crate::Result;

/// Downloads and stores statement documents.
///
/// Implementations must stop starting new downloads once `deadline` has
/// passed and report the batch as truncated; files saved before that stay.
#[async_trait]
pub trait FileSaver: Send + Sync {
    async fn save_files(
        &self,
        documents: Vec<StatementDocument>,
        deadline: Instant,
    ) -> Result<SaveReport>;
}
