//! Error types for the portal crate.
//!
//! [`PortalError`] covers everything that can go wrong while talking to the
//! bank's website. It converts into [`bankfetch_core::Error`] at the crate
//! boundary so the pipeline can apply its fatal/degraded policy.

use bankfetch_core::Error as CoreError;
use thiserror::Error;

/// Errors raised while driving the portal.
#[derive(Error, Debug)]
pub enum PortalError {
    /// The bank identifier is not in the region table.
    #[error("The bank id {0} is unknown")]
    UnknownBank(String),

    /// The region table itself could not be loaded.
    #[error("Invalid region table: {0}")]
    RegionTable(String),

    /// A page lacks the markup the flow depends on.
    /// The portal changed; retrying will not help.
    #[error("Missing markup on {page}: {detail}")]
    MissingMarkup {
        /// Logical page name (login page, keypad, accounts...)
        page: &'static str,
        /// What was expected
        detail: String,
    },

    /// The credentials were rejected.
    #[error("Login refused: {0}")]
    LoginRefused(String),

    /// The credential contains something the keypad cannot type.
    #[error("Credential cannot be typed on the keypad: {0}")]
    InvalidCredential(String),

    /// A URL could not be built from the scraped parts.
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The portal answered with an error status.
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    /// The spreadsheet export could not be decoded.
    #[error("Unreadable export: {0}")]
    Spreadsheet(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl PortalError {
    pub(crate) fn missing(page: &'static str, detail: impl Into<String>) -> Self {
        Self::MissingMarkup {
            page,
            detail: detail.into(),
        }
    }
}

impl From<calamine::Error> for PortalError {
    fn from(err: calamine::Error) -> Self {
        PortalError::Spreadsheet(err.to_string())
    }
}

impl From<PortalError> for CoreError {
    fn from(err: PortalError) -> Self {
        match err {
            PortalError::UnknownBank(_) | PortalError::RegionTable(_) => {
                CoreError::Configuration(err.to_string())
            }
            PortalError::LoginRefused(_) | PortalError::InvalidCredential(_) => {
                CoreError::Authentication(err.to_string())
            }
            PortalError::MissingMarkup { .. }
            | PortalError::InvalidUrl { .. }
            | PortalError::Spreadsheet(_) => CoreError::Protocol(err.to_string()),
            PortalError::Status { .. } | PortalError::Network(_) => {
                CoreError::Http(err.to_string())
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use bankfetch_core::errors::{LOGIN_FAILED, VENDOR_DOWN};

    #[test]
    fn test_unknown_bank_maps_to_login_failed() {
        let err: CoreError = PortalError::UnknownBank("atlantide".to_string()).into();
        assert!(matches!(err, CoreError::Configuration(_)));
        assert_eq!(err.boundary_code(), LOGIN_FAILED);
        assert!(err.to_string().contains("The bank id atlantide is unknown"));
    }

    #[test]
    fn test_missing_markup_is_protocol() {
        let err: CoreError = PortalError::missing("keypad", "no #pave-saisie-code cells").into();
        assert!(matches!(err, CoreError::Protocol(_)));
        assert_eq!(err.boundary_code(), VENDOR_DOWN);
    }

    #[test]
    fn test_refused_login_is_authentication() {
        let err: CoreError = PortalError::LoginRefused("no account table".to_string()).into();
        assert!(matches!(err, CoreError::Authentication(_)));
        assert_eq!(err.boundary_code(), LOGIN_FAILED);
    }

    #[test]
    fn test_status_is_http() {
        let err: CoreError = PortalError::Status {
            status: 503,
            url: "https://www.ca-paris.fr/particuliers.html".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::Http(_)));
    }
}
