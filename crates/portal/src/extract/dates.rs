//! Operation dates of the spreadsheet export.
//!
//! The export prints `25-déc` or `25-Dec` with no year: month names are
//! abbreviated in French or English depending on the line, with accents
//! that survive the encoding only sometimes.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone, Utc};

fn strip_accents(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

fn month_number(token: &str) -> Option<u32> {
    let month = match token.trim_end_matches('.') {
        "jan" | "janv" | "janvier" | "january" => 1,
        "feb" | "fev" | "fevr" | "fevrier" | "february" => 2,
        "mar" | "mars" | "march" => 3,
        "apr" | "avr" | "avril" | "april" => 4,
        "may" | "mai" => 5,
        "jun" | "juin" | "june" => 6,
        "jul" | "juil" | "juillet" | "july" => 7,
        "aug" | "aou" | "aout" | "august" => 8,
        "sep" | "sept" | "septembre" | "september" => 9,
        "oct" | "octobre" | "october" => 10,
        "nov" | "novembre" | "november" => 11,
        "dec" | "decembre" | "december" => 12,
        numeric => numeric.parse::<u32>().ok().filter(|m| (1..=12).contains(m))?,
    };
    Some(month)
}

/// Day and month of a `DD-MMM` cell.
pub fn parse_day_month(text: &str) -> Option<(u32, u32)> {
    let normalized = strip_accents(&text.trim().to_lowercase());
    let mut parts = normalized
        .split(|c: char| c == '-' || c == '/' || c.is_whitespace())
        .filter(|p| !p.is_empty());

    let day = parts.next()?.parse::<u32>().ok().filter(|d| (1..=31).contains(d))?;
    let month = month_number(parts.next()?)?;
    Some((day, month))
}

/// Places a yearless date in the twelve months ending tomorrow.
///
/// The current year is used unless that lands more than one day after
/// `today` (or does not exist, like 29 February), then the previous year.
pub fn resolve_year(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    let limit = today + Duration::days(1);
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date <= limit => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() - 1, month, day),
    }
}

/// Calendar day of `now` in `tz`.
pub fn calendar_day<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// Today on the host's calendar, the one the portal dates its exports in.
pub fn local_today() -> NaiveDate {
    calendar_day(Utc::now(), &Local)
}

/// Full date of an export cell relative to `today`.
pub fn parse_operation_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (day, month) = parse_day_month(text)?;
    resolve_year(day, month, today)
}
