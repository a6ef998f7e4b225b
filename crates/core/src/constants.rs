/// Collection holding bank accounts.
pub const ACCOUNTS_COLLECTION: &str = "bank.accounts";

/// Collection holding account operations (transactions).
pub const OPERATIONS_COLLECTION: &str = "bank.operations";

/// Collection holding per-year balance histories.
pub const BALANCE_HISTORIES_COLLECTION: &str = "bank.balancehistories";

/// Identity field assigned by the store.
pub const ID_FIELD: &str = "_id";

/// Currency of every amount exported by the portal.
pub const DEFAULT_CURRENCY: &str = "EUR";

/// Date format used for balance keys and statement dates.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";
