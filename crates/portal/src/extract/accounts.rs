//! Account summary page.

use std::collections::HashSet;

use bankfetch_core::Account;
use lazy_static::lazy_static;
use scraper::{ElementRef, Html, Selector};
use tracing::{info, warn};

use super::amounts::parse_french_decimal;
use crate::errors::{PortalError, Result};
use crate::html::{attr, element_text};
use crate::patterns::MarkupPatterns;

lazy_static! {
    static ref ACCOUNT_ROW: Selector = Selector::parse(".ca-table tbody tr").expect("Invalid selector");
    static ref CELL: Selector = Selector::parse("td").expect("Invalid selector");
    static ref IMAGE: Selector = Selector::parse("img").expect("Invalid selector");
    static ref LINK: Selector = Selector::parse("a").expect("Invalid selector");
}

const MIN_ACCOUNT_CELLS: usize = 4;

/// Text a summary cell stands for.
///
/// Long labels are truncated on screen, the full one sits in the
/// `onmouseover` tooltip. The export icon cell stands for its link token.
fn cell_value(cell: &ElementRef<'_>, patterns: &dyn MarkupPatterns) -> Result<String> {
    if cell.select(&IMAGE).next().is_some() {
        let href = cell
            .select(&LINK)
            .next()
            .and_then(|a| attr(&a, "href"))
            .unwrap_or_default();
        return patterns
            .handler_argument(&href)
            .ok_or_else(|| PortalError::missing("accounts page", "operations link token"));
    }

    if let Some(full) = attr(cell, "onmouseover").and_then(|h| patterns.quoted_text(&h)) {
        return Ok(full.trim().to_string());
    }
    Ok(element_text(cell))
}

/// Reads the accounts of the summary table, in page order.
///
/// Only rows with an export icon are accounts. A repeated account number is
/// dropped, keeping its first row.
pub fn parse_accounts(html: &Html, patterns: &dyn MarkupPatterns) -> Result<Vec<Account>> {
    let mut accounts = Vec::new();
    let mut seen = HashSet::new();

    let rows = html
        .select(&ACCOUNT_ROW)
        .filter(|row| row.select(&IMAGE).next().is_some());

    for (index, row) in rows.enumerate() {
        let mut cells = Vec::new();
        for cell in row.select(&CELL) {
            let value = cell_value(&cell, patterns)?;
            if !value.is_empty() {
                cells.push(value);
            }
        }

        if cells.len() < MIN_ACCOUNT_CELLS {
            return Err(PortalError::missing(
                "accounts page",
                format!("account row {} has {} cells", index + 1, cells.len()),
            ));
        }

        let balance = parse_french_decimal(&cells[2]).ok_or_else(|| {
            PortalError::missing(
                "accounts page",
                format!("unreadable balance '{}' on account row {}", cells[2], index + 1),
            )
        })?;
        let account = Account::new(&cells[0], &cells[1], balance, &cells[cells.len() - 1]);

        if !seen.insert(account.number.clone()) {
            warn!("Account {} listed twice, keeping the first row", account.number);
            continue;
        }
        accounts.push(account);
    }

    info!("Found {} accounts", accounts.len());
    Ok(accounts)
}
