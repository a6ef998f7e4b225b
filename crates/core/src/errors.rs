//! Core error types for bankfetch.
//!
//! This module defines storage-agnostic error types. Portal and storage
//! errors are converted to these types by their own crates.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Code reported to whoever launched the run when it aborts.
pub const LOGIN_FAILED: &str = "LOGIN_FAILED";
pub const VENDOR_DOWN: &str = "VENDOR_DOWN";
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// Whether an error stops the pipeline or only degrades its output.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Severity {
    /// Abort the whole run.
    Fatal,
    /// Log, keep going with degraded data.
    Degraded,
}

/// Root error type for a bankfetch run.
#[derive(Error, Debug)]
pub enum Error {
    /// Unknown bank identifier or unusable settings; raised before any request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    /// Expected markup is missing: the portal changed under us.
    #[error("Portal protocol error: {0}")]
    Protocol(String),

    /// Credentials rejected or the handshake did not reach the account page.
    #[error("{LOGIN_FAILED}: {0}")]
    Authentication(String),

    /// The portal could not be reached or answered with an error status.
    #[error("Portal request failed: {0}")]
    Http(String),

    /// A scraped row could not be fully interpreted.
    #[error("Data quality issue: {0}")]
    DataQuality(String),

    /// A document download window closed before every file was saved.
    #[error("Download window exceeded for {account}: {saved} of {total} documents saved")]
    TimeoutTruncation {
        account: String,
        saved: usize,
        total: usize,
    },

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("File storage failed: {0}")]
    FileStorage(String),
}

impl Error {
    /// Classifies the error for the pipeline's propagation policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use bankfetch_core::errors::{Error, Severity};
    ///
    /// let error = Error::DataQuality("row 12 has no amount".to_string());
    /// assert_eq!(error.severity(), Severity::Degraded);
    ///
    /// let error = Error::Authentication("keypad rejected".to_string());
    /// assert_eq!(error.severity(), Severity::Fatal);
    /// ```
    pub fn severity(&self) -> Severity {
        match self {
            Self::DataQuality(_) | Self::TimeoutTruncation { .. } => Severity::Degraded,
            _ => Severity::Fatal,
        }
    }

    /// Code surfaced at the process boundary when a run aborts.
    ///
    /// An unknown bank is reported like rejected credentials: both mean the
    /// user has to fix what they typed.
    pub fn boundary_code(&self) -> &'static str {
        match self {
            Self::Configuration(_)
            | Self::MissingConfigKey(_)
            | Self::InvalidConfigValue(_)
            | Self::Authentication(_) => LOGIN_FAILED,
            Self::Protocol(_) | Self::Http(_) => VENDOR_DOWN,
            _ => UNKNOWN_ERROR,
        }
    }
}

/// Storage-agnostic error type for store operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for records and parsed values.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::FileStorage(err.to_string())
    }
}
