//! Randomized login keypad.
//!
//! The portal shuffles its digit buttons on every visit and each button posts
//! an opaque code instead of the digit. The mapping is read from the keypad
//! page of the current session and discarded after login.

use std::collections::HashMap;

use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tracing::debug;

use super::forms::HiddenFields;
use crate::errors::{PortalError, Result};
use crate::html::{attr, element_text};
use crate::patterns::MarkupPatterns;

lazy_static! {
    static ref KEYPAD_CELL: Selector =
        Selector::parse("#pave-saisie-code td").expect("Invalid selector");
    static ref CELL_LINK: Selector = Selector::parse("a").expect("Invalid selector");
    static ref ID_UNIQUE: Selector =
        Selector::parse("input[name=idUnique]").expect("Invalid selector");
    static ref CAISSE: Selector = Selector::parse("input[name=caisse]").expect("Invalid selector");
}

/// Displayed digit to posted code.
#[derive(Clone, PartialEq, Eq)]
pub struct Keypad {
    codes: HashMap<char, String>,
}

impl std::fmt::Debug for Keypad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Keypad")
            .field("keys", &self.codes.len())
            .finish()
    }
}

impl Keypad {
    /// Reads the keypad table. Blank filler cells are ignored.
    pub fn parse(html: &Html, patterns: &dyn MarkupPatterns) -> Result<Self> {
        let mut codes = HashMap::new();

        for cell in html.select(&KEYPAD_CELL) {
            let label = cell
                .select(&CELL_LINK)
                .next()
                .map(|a| element_text(&a))
                .unwrap_or_default();
            let mut chars = label.chars();
            let (Some(digit), None) = (chars.next(), chars.next()) else {
                continue;
            };
            match attr(&cell, "onclick").and_then(|h| patterns.quoted_text(&h)) {
                Some(code) => {
                    codes.insert(digit, code);
                }
                None => debug!("Keypad key {} has no code, ignored", digit),
            }
        }

        if codes.is_empty() {
            return Err(PortalError::missing("keypad", "no usable #pave-saisie-code cell"));
        }
        Ok(Self { codes })
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Translates the secret digit by digit into comma-joined key codes.
    pub fn encode(&self, secret: &str) -> Result<String> {
        let mut encoded = Vec::with_capacity(secret.len());
        for (position, c) in secret.chars().enumerate() {
            if !c.is_ascii_digit() {
                return Err(PortalError::InvalidCredential(format!(
                    "character at position {} is not a digit",
                    position + 1
                )));
            }
            let code = self.codes.get(&c).ok_or_else(|| {
                PortalError::missing("keypad", format!("no key for digit {}", c))
            })?;
            encoded.push(code.as_str());
        }
        Ok(encoded.join(","))
    }
}

/// Checks a secret can be typed on a numeric keypad, before any request.
pub fn validate_secret(secret: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(PortalError::InvalidCredential("empty secret".to_string()));
    }
    if let Some(position) = secret.chars().position(|c| !c.is_ascii_digit()) {
        return Err(PortalError::InvalidCredential(format!(
            "character at position {} is not a digit",
            position + 1
        )));
    }
    Ok(())
}

/// Hidden `idUnique` and `caisse` inputs of the keypad page.
pub fn parse_hidden_fields(html: &Html) -> Result<HiddenFields> {
    let value_of = |selector: &Selector, name: &str| {
        html.select(selector)
            .next()
            .and_then(|input| attr(&input, "value"))
            .ok_or_else(|| PortalError::missing("keypad", format!("hidden input {}", name)))
    };
    Ok(HiddenFields {
        id_unique: value_of(&ID_UNIQUE, "idUnique")?,
        caisse: value_of(&CAISSE, "caisse")?,
    })
}
