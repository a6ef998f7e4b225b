//! Extractors turning portal pages and exports into domain records.
//!
//! Parsing functions are synchronous and take already-fetched content;
//! the `fetch_*` functions pair them with the session requests.

mod accounts;
mod amounts;
mod dates;
mod spreadsheet;
mod statements;
mod transactions;

pub use accounts::parse_accounts;
pub use amounts::{cell_decimal, parse_french_decimal};
pub use dates::{calendar_day, local_today, parse_day_month, parse_operation_date, resolve_year};
pub use spreadsheet::{cell_text, read_first_sheet};
pub use statements::{
    clean_document_label, compact_date, fetch_statement_accounts, fetch_statement_documents,
    parse_statement_index, parse_statement_listing, statement_filename, StatementAccount,
    STATEMENTS_HEADING,
};
pub use transactions::{
    export_url, fetch_transactions, parse_export, split_label, DataQualityIssue,
    ExtractedTransactions, HEADER_ROWS, LABEL_SEPARATOR,
};
