//! Operations export of one account.

use bankfetch_core::{Account, Error as CoreError, Stored, Transaction};
use calamine::Data;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use super::amounts::cell_decimal;
use super::dates::{local_today, parse_operation_date};
use super::spreadsheet::{cell_text, read_first_sheet};
use crate::auth::AuthenticatedSession;
use crate::errors::Result;

/// Title block above the operation lines.
pub const HEADER_ROWS: usize = 9;

/// Separator between the parts of an operation label.
pub const LABEL_SEPARATOR: &str = "\u{1b} :";

const DATE_COLUMN: usize = 0;
const LABEL_COLUMN: usize = 1;
const DEBIT_COLUMN: usize = 2;
const CREDIT_COLUMN: usize = 3;

/// A row that could only be partly interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataQualityIssue {
    /// 1-based row in the worksheet.
    pub row: usize,
    pub reason: String,
}

impl From<DataQualityIssue> for CoreError {
    fn from(issue: DataQualityIssue) -> Self {
        CoreError::DataQuality(format!("row {}: {}", issue.row, issue.reason))
    }
}

/// Transactions of one export plus what went wrong on the way.
#[derive(Debug, Clone, Default)]
pub struct ExtractedTransactions {
    pub transactions: Vec<Transaction>,
    pub issues: Vec<DataQualityIssue>,
}

/// Export URL of an account's operations.
pub fn export_url(base_url: &str, link_operations: &str) -> String {
    format!("{}/stb/{}&typeaction=telechargement", base_url, link_operations)
}

/// Splits a label cell into its trimmed parts.
pub fn split_label(text: &str) -> Vec<String> {
    text.split(LABEL_SEPARATOR)
        .map(|part| part.trim().to_string())
        .collect()
}

// Blank separator lines render as ",,," once the first four cells are
// joined: three characters or less means nothing to read.
fn is_short_row(row: &[Data]) -> bool {
    let rendered: Vec<String> = (0..=CREDIT_COLUMN).map(|i| cell_text(row.get(i))).collect();
    rendered.join(",").chars().count() <= 3
}

/// Signed amount of a row: debit negated, else credit.
fn row_amount(row: &[Data], line: usize, issues: &mut Vec<DataQualityIssue>) -> Decimal {
    let (column, sign) = if !cell_text(row.get(DEBIT_COLUMN)).is_empty() {
        (DEBIT_COLUMN, Decimal::NEGATIVE_ONE)
    } else if !cell_text(row.get(CREDIT_COLUMN)).is_empty() {
        (CREDIT_COLUMN, Decimal::ONE)
    } else {
        error!("Could not find an amount in row {}", line);
        issues.push(DataQualityIssue {
            row: line,
            reason: "no debit nor credit".to_string(),
        });
        return Decimal::ZERO;
    };

    match row.get(column).and_then(cell_decimal) {
        Some(value) => sign * value,
        None => {
            let text = cell_text(row.get(column));
            error!("Unreadable amount '{}' in row {}", text, line);
            issues.push(DataQualityIssue {
                row: line,
                reason: format!("unreadable amount '{}'", text),
            });
            Decimal::ZERO
        }
    }
}

/// Turns export rows into transactions of `account_id`.
///
/// Rows with an unreadable date are skipped; rows with no readable amount
/// are kept at zero. Both are reported as issues.
pub fn parse_export(
    rows: &[Vec<Data>],
    account_id: &str,
    today: NaiveDate,
    imported_at: DateTime<Utc>,
) -> ExtractedTransactions {
    let mut extracted = ExtractedTransactions::default();

    for (offset, row) in rows.iter().enumerate().skip(HEADER_ROWS) {
        if is_short_row(row) {
            continue;
        }
        let line = offset + 1;

        let date_text = cell_text(row.get(DATE_COLUMN));
        let Some(date) = parse_operation_date(&date_text, today) else {
            warn!("Skipping row {}: unreadable date '{}'", line, date_text);
            extracted.issues.push(DataQualityIssue {
                row: line,
                reason: format!("unreadable date '{}'", date_text),
            });
            continue;
        };

        let amount = row_amount(row, line, &mut extracted.issues);
        let labels = split_label(&cell_text(row.get(LABEL_COLUMN)));
        extracted.transactions.push(Transaction::from_labels(
            &labels,
            date,
            amount,
            account_id,
            imported_at,
        ));
    }
    extracted
}

/// Downloads and parses the operations export of `account`.
pub async fn fetch_transactions(
    session: &AuthenticatedSession,
    account: &Stored<Account>,
) -> Result<ExtractedTransactions> {
    info!("Getting operations for {}", account.record.label);
    let url = export_url(&session.base_url, &account.record.link_operations);
    let bytes = session.client.fetch_bytes(&url).await?;

    let rows = read_first_sheet(&bytes)?;
    let extracted = parse_export(&rows, &account.id, local_today(), Utc::now());
    info!(
        "{} operations for {} ({} issues)",
        extracted.transactions.len(),
        account.record.label,
        extracted.issues.len()
    );
    Ok(extracted)
}
