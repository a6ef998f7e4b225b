use super::accounts_model::AccountType;

/// Institution label stamped on every scraped account.
pub const INSTITUTION_LABEL: &str = "Crédit Agricole";

/// Unique key used when upserting accounts.
pub const ACCOUNT_UNIQUE_KEY: &str = "number";

/// Account labels with a known type. Labels are matched verbatim, as the
/// portal prints them in the summary table.
const LABEL_TYPES: &[(&str, AccountType)] = &[
    ("LIVRET A", AccountType::Bank),
    ("COMPTE CHEQUE", AccountType::Bank),
];

/// Maps a portal account label to its account type.
///
/// Labels missing from the table map to [`AccountType::Unknown`]; they are
/// kept, never dropped.
pub fn account_type_for_label(label: &str) -> AccountType {
    LABEL_TYPES
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, account_type)| *account_type)
        .unwrap_or(AccountType::Unknown)
}
