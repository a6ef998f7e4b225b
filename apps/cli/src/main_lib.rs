use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};
use bankfetch_connect::{LoggingProgressReporter, SyncConfig, SyncOrchestrator, SyncSummary};
use bankfetch_core::Result;
use bankfetch_portal::{Credentials, DefaultMarkupPatterns, RegionTable};
use bankfetch_storage_sqlite::{open_store, SqliteDocumentStore};

pub struct AppState {
    pub store: Arc<SqliteDocumentStore>,
    pub regions: RegionTable,
    pub orchestrator: SyncOrchestrator<LoggingProgressReporter>,
}

pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("Tracing subscriber already installed");
    }
}

pub async fn build_state(config: &Config) -> Result<AppState> {
    let store = Arc::new(open_store(&config.db_path)?);
    tracing::info!("Database path in use: {}", config.db_path);

    let regions = match &config.regions_file {
        Some(path) => RegionTable::from_file(path)?,
        None => RegionTable::embedded()?,
    };
    tracing::info!("{} regional banks known", regions.len());

    let orchestrator = SyncOrchestrator::new(
        store.clone(),
        Arc::new(LoggingProgressReporter),
        Arc::new(DefaultMarkupPatterns),
        SyncConfig {
            download_timeout: config.download_timeout,
            http_timeout: config.http_timeout,
            transaction_policy: config.transaction_policy,
            files_dir: config.files_dir.clone(),
        },
    );

    Ok(AppState {
        store,
        regions,
        orchestrator,
    })
}

/// Runs one sync for the configured login.
pub async fn run(state: &AppState, config: &Config) -> Result<SyncSummary> {
    let credentials = Credentials::new(&config.login, &config.password);
    state
        .orchestrator
        .run(&state.regions, &config.bank_id, credentials)
        .await
}
