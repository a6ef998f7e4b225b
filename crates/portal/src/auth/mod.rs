//! Login to the portal.
//!
//! The login is a chain of dependent requests modelled as [`LoginState`]
//! values: each step consumes the previous state and produces the next,
//! carrying the URLs and tokens discovered so far.

mod forms;
mod keypad;
mod login;

pub use forms::HiddenFields;
pub use keypad::{parse_hidden_fields, validate_secret, Keypad};
pub use login::{
    discover_login, AuthenticatedSession, Credentials, LoginFlow, LoginState, ACCOUNT_TABLE_MARKER,
};
