//! Statement (relevés de comptes) pages.

use bankfetch_core::StatementDocument;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::auth::AuthenticatedSession;
use crate::errors::Result;
use crate::html::{attr, element_text};
use crate::patterns::MarkupPatterns;

/// Heading of the statements section on the index page.
pub const STATEMENTS_HEADING: &str = "RELEVES DE COMPTES";

lazy_static! {
    static ref HEADING: Selector = Selector::parse("#entete1").expect("Invalid selector");
    static ref INDEX_ACCOUNT: Selector =
        Selector::parse("#panneau1 .ca-table tbody").expect("Invalid selector");
    static ref DETAIL_TABLE: Selector =
        Selector::parse("#panneau1 table tbody").expect("Invalid selector");
    static ref ROW: Selector = Selector::parse("tr").expect("Invalid selector");
    static ref TITLED_ROW: Selector = Selector::parse("tr[title]").expect("Invalid selector");
    static ref CELL: Selector = Selector::parse("td").expect("Invalid selector");
    static ref LINK: Selector = Selector::parse("a").expect("Invalid selector");
    static ref OPEN_ARROW: Selector = Selector::parse(".fleche-ouvrir").expect("Invalid selector");
}

/// An account listed on the statements index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementAccount {
    /// Position on the index page. The detail page lists every account's
    /// table in the same order.
    pub index: usize,
    pub label: String,
    pub link: String,
}

/// Account label as it appears in statement filenames: words joined by `_`
/// and the first dot dropped. Later dots are kept so that filenames of
/// statements saved by earlier runs still match.
pub fn clean_document_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replacen('.', "", 1)
}

/// `25/03/2024` to `20240325`.
pub fn compact_date(text: &str) -> String {
    text.trim()
        .split('/')
        .rev()
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("")
}

pub fn statement_filename(date_text: &str, label: &str) -> String {
    format!("releve_{}_{}.pdf", compact_date(date_text), label)
}

/// Accounts with statements, or nothing when the section is absent.
pub fn parse_statement_index(html: &Html, base_url: &str) -> Vec<StatementAccount> {
    let heading = html
        .select(&HEADING)
        .next()
        .map(|h| element_text(&h))
        .unwrap_or_default();
    if heading != STATEMENTS_HEADING {
        warn!("No account statement");
        return Vec::new();
    }

    let mut accounts = Vec::new();
    for (index, table) in html.select(&INDEX_ACCOUNT).enumerate() {
        let label = table
            .select(&ROW)
            .next()
            .and_then(|row| row.select(&LINK).nth(1))
            .map(|a| clean_document_label(&element_text(&a)))
            .unwrap_or_default();

        let Some(href) = table.select(&OPEN_ARROW).next().and_then(|a| attr(&a, "href")) else {
            warn!("Statements of '{}' have no detail link, skipped", label);
            continue;
        };
        accounts.push(StatementAccount {
            index,
            label,
            link: format!("{}/stb/{}", base_url, href),
        });
    }
    accounts
}

/// Statements of `account` on its detail page.
pub fn parse_statement_listing(
    html: &Html,
    account: &StatementAccount,
    base_url: &str,
    patterns: &dyn MarkupPatterns,
) -> Vec<StatementDocument> {
    let Some(table) = html.select(&DETAIL_TABLE).nth(account.index) else {
        warn!("No statement table for {}", account.label);
        return Vec::new();
    };

    table
        .select(&TITLED_ROW)
        .filter_map(|row| {
            let cells: Vec<_> = row.select(&CELL).collect();
            let date = cells.first().map(element_text)?;
            let token = cells
                .get(3)
                .and_then(|cell| cell.select(&LINK).next())
                .and_then(|a| attr(&a, "href"))
                .and_then(|href| patterns.download_token(&href));
            let Some(token) = token else {
                warn!("Statement of {} dated {} has no download link", account.label, date);
                return None;
            };
            Some(StatementDocument {
                fileurl: format!("{}/stb/{}&typeaction=telechargement", base_url, token),
                filename: statement_filename(&date, &account.label),
            })
        })
        .collect()
}

/// Fetches the statements index of the session.
pub async fn fetch_statement_accounts(
    session: &AuthenticatedSession,
) -> Result<Vec<StatementAccount>> {
    info!("Getting the list of accounts with account statements");
    let page = session.client.get_page(&session.statements_url).await?;
    Ok(parse_statement_index(&page.html(), &session.base_url))
}

/// Fetches the statement descriptors of one index account.
pub async fn fetch_statement_documents(
    session: &AuthenticatedSession,
    account: &StatementAccount,
    patterns: &dyn MarkupPatterns,
) -> Result<Vec<StatementDocument>> {
    let page = session.client.get_page(&account.link).await?;
    let documents = parse_statement_listing(&page.html(), account, &session.base_url, patterns);
    info!("{} statements listed for {}", documents.len(), account.label);
    Ok(documents)
}
