//! bankfetch portal crate.
//!
//! Everything specific to the Crédit Agricole web portal: the regional URL
//! table, a cookie-keeping HTTP session, the keypad login and the
//! extractors for accounts, operations exports and statements.
//!
//! # Flow
//!
//! ```text
//! bank id --RegionTable--> bank url --LoginFlow--> AuthenticatedSession
//!                                                     |
//!          +------------------------+-----------------+
//!          v                        v                 v
//!    parse_accounts        fetch_transactions   fetch_statement_*
//! ```
//!
//! The portal markup is the only contract. Values hidden inside inline
//! scripts are read through [`MarkupPatterns`].

pub mod auth;
pub mod client;
pub mod errors;
pub mod extract;
mod html;
pub mod patterns;
pub mod region;

pub use auth::{AuthenticatedSession, Credentials, LoginFlow, LoginState};
pub use client::{Page, SessionClient};
pub use errors::PortalError;
pub use patterns::{DefaultMarkupPatterns, MarkupPatterns};
pub use region::RegionTable;
