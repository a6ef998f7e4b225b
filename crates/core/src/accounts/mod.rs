//! Accounts module - domain model and the label classification table.

mod accounts_constants;
mod accounts_model;

// Re-export the public interface
pub use accounts_constants::*;
pub use accounts_model::{Account, AccountType};
