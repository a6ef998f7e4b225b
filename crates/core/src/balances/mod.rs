//! Balance histories - one series of daily balances per account and year.

mod balances_model;
mod balances_service;

pub use balances_model::{
    AccountRelationship, BalanceHistory, BalanceHistoryMetadata, BalanceHistoryRelationships,
    RelationshipData, BALANCE_HISTORY_INDEX, BALANCE_HISTORY_VERSION,
};
pub use balances_service::BalanceHistoryService;
