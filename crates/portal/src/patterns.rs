//! Patterns for the values the portal hides inside scripts and handlers.
//!
//! Login endpoints, full account labels and export tokens are not plain
//! attributes: they sit inside inline JavaScript. Extractors go through
//! [`MarkupPatterns`] so the regexes live in one place.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `var chemin = "https://.../login"` in the landing page scripts.
    static ref LOGIN_PATH_REGEX: Regex =
        Regex::new(r#"var chemin\s*=\s*"([^"]*)""#).expect("Invalid regex pattern");

    /// Greedy single-quoted text: `'LIVRET A'` in `onmouseover`, key codes in `onclick`.
    static ref QUOTED_TEXT_REGEX: Regex =
        Regex::new(r"'(.*)'").expect("Invalid regex pattern");

    /// Argument of a handler call: `javascript:go('TOKEN')`.
    static ref HANDLER_ARGUMENT_REGEX: Regex =
        Regex::new(r"\('(.*)'\)").expect("Invalid regex pattern");
}

/// Extraction rules for script-embedded values.
pub trait MarkupPatterns: Send + Sync {
    /// Login endpoint declared in a landing page script.
    fn login_path(&self, script: &str) -> Option<String>;

    /// Quoted text of an inline handler attribute.
    fn quoted_text(&self, attribute: &str) -> Option<String>;

    /// Quoted argument of a handler call in a link.
    fn handler_argument(&self, href: &str) -> Option<String>;

    /// Download token of a statement link.
    fn download_token(&self, href: &str) -> Option<String>;
}

/// Patterns matching the portal's current markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMarkupPatterns;

fn first_capture(regex: &Regex, haystack: &str) -> Option<String> {
    regex
        .captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

impl MarkupPatterns for DefaultMarkupPatterns {
    fn login_path(&self, script: &str) -> Option<String> {
        first_capture(&LOGIN_PATH_REGEX, script).filter(|p| !p.is_empty())
    }

    fn quoted_text(&self, attribute: &str) -> Option<String> {
        first_capture(&QUOTED_TEXT_REGEX, attribute)
    }

    fn handler_argument(&self, href: &str) -> Option<String> {
        first_capture(&HANDLER_ARGUMENT_REGEX, href)
    }

    // Statement links read `javascript:void(0);ouvrePDF('TOKEN')`: the token
    // is the handler argument of the second statement.
    fn download_token(&self, href: &str) -> Option<String> {
        let statement = href.split(';').nth(1)?;
        self.handler_argument(statement)
    }
}
