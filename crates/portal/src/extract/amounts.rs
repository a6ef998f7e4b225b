//! French-formatted numbers: `1 234,56`, `-12,34 €`.

use std::str::FromStr;

use calamine::Data;
use rust_decimal::Decimal;

/// Parses a French-formatted decimal.
///
/// Thousands separators (regular, non-breaking and narrow spaces) and a
/// trailing euro sign are dropped; the decimal comma becomes a point.
pub fn parse_french_decimal(text: &str) -> Option<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    Decimal::from_str(cleaned).ok()
}

/// Decimal value of a spreadsheet cell, numeric or French text.
pub fn cell_decimal(cell: &Data) -> Option<Decimal> {
    match cell {
        Data::Int(i) => Some(Decimal::from(*i)),
        // Shortest round-trip rendering, so 12.34 stays 12.34.
        Data::Float(f) if f.is_finite() => Decimal::from_str(&f.to_string()).ok(),
        Data::String(s) => parse_french_decimal(s),
        _ => None,
    }
}
