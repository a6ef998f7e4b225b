use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::time::{timeout_at, Instant};

use bankfetch_core::{FileSaver, Result, SaveReport, StatementDocument};
use bankfetch_portal::SessionClient;

/// Saves statements into a directory, downloading through the
/// authenticated session.
///
/// A file already present under the same name is not downloaded again. A
/// document that cannot be fetched or written is reported as failed and the
/// rest of the batch still goes through.
pub struct DirectoryFileSaver {
    client: SessionClient,
    dir: PathBuf,
}

impl DirectoryFileSaver {
    pub fn new(client: SessionClient, dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

/// Keeps a document filename inside the target directory.
pub fn safe_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}

#[async_trait]
impl FileSaver for DirectoryFileSaver {
    async fn save_files(
        &self,
        documents: Vec<StatementDocument>,
        deadline: Instant,
    ) -> Result<SaveReport> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let mut report = SaveReport::default();

        for document in documents {
            let filename = safe_filename(&document.filename);
            let path = self.dir.join(&filename);

            if tokio::fs::try_exists(&path).await? {
                debug!("{} already saved", filename);
                report.skipped.push(filename);
                continue;
            }
            if Instant::now() >= deadline {
                report.truncated = true;
                break;
            }

            let bytes = match timeout_at(deadline, self.client.fetch_bytes(&document.fileurl)).await
            {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(err)) => {
                    warn!("Could not download {}: {}", filename, err);
                    report.failed.push(filename);
                    continue;
                }
                Err(_) => {
                    warn!("Download window closed while fetching {}", filename);
                    report.truncated = true;
                    break;
                }
            };
            if let Err(err) = tokio::fs::write(&path, &bytes).await {
                warn!("Could not write {}: {}", path.display(), err);
                report.failed.push(filename);
                continue;
            }
            info!("Saved {} ({} bytes)", filename, bytes.len());
            report.saved.push(filename);
        }
        Ok(report)
    }
}
