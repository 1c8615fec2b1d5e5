//! Locale-aware conversion of raw cell text into dates and decimal amounts.

use chrono::{Datelike, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use crate::schema::{CellValue, DateOrder, Locale};
use crate::text::fold_case_and_accents;

/// Spreadsheet serial numbers count days from this epoch.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);
/// Serial 2958465 is 9999-12-31, the last date a spreadsheet can hold.
const MAX_SERIAL: u64 = 2_958_466;
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2200;

/// chrono patterns tried against purely numeric dates, tagged with the field order
/// they assume. Textual months, compact `YYYYMMDD` and serial numbers are handled
/// separately.
pub const DATE_PATTERNS: &[(&str, DateOrder)] = &[
    ("%Y-%m-%d", DateOrder::Any),
    ("%Y/%m/%d", DateOrder::Any),
    ("%Y.%m.%d", DateOrder::Any),
    ("%Y %m %d", DateOrder::Any),
    ("%d/%m/%Y", DateOrder::DayFirst),
    ("%d-%m-%Y", DateOrder::DayFirst),
    ("%d.%m.%Y", DateOrder::DayFirst),
    ("%d %m %Y", DateOrder::DayFirst),
    ("%d/%m/%y", DateOrder::DayFirst),
    ("%d-%m-%y", DateOrder::DayFirst),
    ("%d.%m.%y", DateOrder::DayFirst),
    ("%d %m %y", DateOrder::DayFirst),
    ("%m/%d/%Y", DateOrder::MonthFirst),
    ("%m-%d-%Y", DateOrder::MonthFirst),
    ("%m.%d.%Y", DateOrder::MonthFirst),
    ("%m %d %Y", DateOrder::MonthFirst),
    ("%m/%d/%y", DateOrder::MonthFirst),
    ("%m-%d-%y", DateOrder::MonthFirst),
    ("%m.%d.%y", DateOrder::MonthFirst),
    ("%m %d %y", DateOrder::MonthFirst),
];

static TIME_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\sT]+\d{1,2}:\d{2}(:\d{2}(\.\d+)?)?\s*(am|pm)?\s*(z|[+-]\d{2}:?\d{2})?$")
        .expect("time suffix pattern is valid")
});

static MONTH_NAMES: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    let table: &[(&[&str], u32)] = &[
        (&["jan", "january", "janvier", "janv", "enero", "ene", "januar", "janner", "mutarama"], 1),
        (&["feb", "february", "fevrier", "fev", "fevr", "febrero", "februar", "gashyantare"], 2),
        (&["mar", "march", "mars", "marzo", "marz", "werurwe"], 3),
        (&["apr", "april", "avril", "avr", "abril", "abr", "mata"], 4),
        (&["may", "mai", "mayo", "gicurasi"], 5),
        (&["jun", "june", "juin", "junio", "juni", "kamena"], 6),
        (&["jul", "july", "juillet", "juil", "julio", "juli", "nyakanga"], 7),
        (&["aug", "august", "aout", "agosto", "ago", "kanama"], 8),
        (&["sep", "sept", "september", "septembre", "septiembre", "setiembre", "nzeri", "nzeli"], 9),
        (&["oct", "october", "octobre", "octubre", "oktober", "okt", "ukwakira"], 10),
        (&["nov", "november", "novembre", "noviembre", "ugushyingo"], 11),
        (&["dec", "december", "decembre", "diciembre", "dic", "dezember", "dez", "ukuboza"], 12),
    ];
    table
        .iter()
        .flat_map(|(names, month)| names.iter().map(move |n| (*n, *month)))
        .collect()
});

const WEEKDAY_NAMES: &[&str] = &[
    "mon", "monday", "tue", "tues", "tuesday", "wed", "wednesday", "thu", "thur", "thurs",
    "thursday", "fri", "friday", "sat", "saturday", "sun", "sunday", "lundi", "mardi",
    "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
];

fn plausible(date: NaiveDate) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year())
}

fn expand_two_digit_year(year: i32) -> i32 {
    if year < 70 {
        2000 + year
    } else {
        1900 + year
    }
}

/// Converts a spreadsheet serial day number into a calendar date.
pub fn serial_to_date(serial: u64) -> Option<NaiveDate> {
    if serial == 0 || serial >= MAX_SERIAL {
        return None;
    }
    let (y, m, d) = SERIAL_EPOCH;
    NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(serial))
}

fn parse_compact(digits: &str) -> Option<NaiveDate> {
    let year = digits.get(0..4)?.parse().ok()?;
    let month = digits.get(4..6)?.parse().ok()?;
    let day = digits.get(6..8)?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day).filter(|d| plausible(*d))
}

/// Dates written with a month name: `5 Jan 2025`, `January 5, 2025`, `2025-janv-05`,
/// `05-MUTARAMA-25`. The month name fixes the field order, so these are never ambiguous.
fn parse_textual(text: &str) -> std::result::Result<NaiveDate, String> {
    let folded = fold_case_and_accents(text);
    let mut month = None;
    let mut numbers = Vec::new();

    for token in folded
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        if token.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(token);
            continue;
        }
        // Ordinal suffixes: 1st, 2nd, 3rd, 5th, 1er
        let stripped = token.trim_end_matches(|c: char| c.is_alphabetic());
        if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) {
            numbers.push(stripped);
            continue;
        }
        if WEEKDAY_NAMES.contains(&token) {
            continue;
        }
        match MONTH_NAMES.get(token) {
            Some(m) if month.is_none() => month = Some(*m),
            Some(_) => return Err("more than one month name".to_string()),
            None => return Err(format!("unrecognized word '{token}'")),
        }
    }

    let month = month.ok_or_else(|| "no month name".to_string())?;
    if numbers.len() != 2 {
        return Err("expected a day and a year next to the month name".to_string());
    }

    let (day_str, year_str) = if numbers[0].len() == 4 {
        (numbers[1], numbers[0])
    } else {
        (numbers[0], numbers[1])
    };
    let day: u32 = day_str.parse().map_err(|_| "invalid day".to_string())?;
    let mut year: i32 = year_str.parse().map_err(|_| "invalid year".to_string())?;
    if year_str.len() <= 2 {
        year = expand_two_digit_year(year);
    }

    NaiveDate::from_ymd_opt(year, month, day)
        .filter(|d| plausible(*d))
        .ok_or_else(|| "day out of range for month".to_string())
}

fn allows(locale_order: DateOrder, pattern_order: DateOrder) -> bool {
    match (locale_order, pattern_order) {
        (_, DateOrder::Any) | (DateOrder::Any, _) => true,
        (a, b) => a == b,
    }
}

/// Parses a date written in any supported pattern.
///
/// All patterns permitted by `order` are tried; when two of them yield different dates
/// the value is rejected as ambiguous instead of guessing.
pub fn parse_date(raw: &str, order: DateOrder) -> std::result::Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("empty value".to_string());
    }

    if trimmed.chars().all(|c| c.is_ascii_digit()) {
        if trimmed.len() == 8 {
            if let Some(date) = parse_compact(trimmed) {
                return Ok(date);
            }
        }
        return trimmed
            .parse::<u64>()
            .ok()
            .and_then(serial_to_date)
            .ok_or_else(|| "numeric value is not a date serial".to_string());
    }

    let without_time = TIME_SUFFIX.replace(trimmed, "");
    let text = without_time.trim();

    if text.chars().any(|c| c.is_alphabetic()) {
        return parse_textual(text);
    }

    let candidates: BTreeSet<NaiveDate> = DATE_PATTERNS
        .iter()
        .filter(|(_, pattern_order)| allows(order, *pattern_order))
        .filter_map(|(pattern, _)| NaiveDate::parse_from_str(text, pattern).ok())
        .filter(|d| plausible(*d))
        .collect();

    let mut iter = candidates.into_iter();
    match (iter.next(), iter.next()) {
        (Some(date), None) => Ok(date),
        (Some(_), Some(_)) => Err("ambiguous date".to_string()),
        (None, _) => Err("unrecognized date format".to_string()),
    }
}

/// Resolves a date cell, accepting native dates and serial numbers as well as text.
pub fn parse_date_cell(cell: &CellValue, order: DateOrder) -> std::result::Result<NaiveDate, String> {
    match cell {
        CellValue::Date(d) => Ok(*d),
        CellValue::Number(n) => {
            if !n.is_finite() || *n < 1.0 {
                return Err("numeric value is not a date serial".to_string());
            }
            let whole = n.trunc() as u64;
            if (10_000_000..100_000_000).contains(&whole) && n.fract() == 0.0 {
                return parse_date(&whole.to_string(), order);
            }
            serial_to_date(whole).ok_or_else(|| "numeric value is not a date serial".to_string())
        }
        CellValue::Text(s) => parse_date(s, order),
        CellValue::Empty => Err("empty value".to_string()),
        CellValue::Error(e) => Err(format!("spreadsheet error {e}")),
    }
}

fn is_currency_char(c: char) -> bool {
    matches!(c, '$' | '€' | '£' | '¥' | '₣' | '₦' | '₵' | '₹')
}

/// Parses a monetary amount written with the locale's decimal separator.
///
/// Accepts thousands separators, surrounding currency codes or symbols, leading or
/// trailing minus signs and accounting parentheses for negatives.
pub fn parse_amount(raw: &str, decimal_separator: char) -> std::result::Result<Decimal, String> {
    let mut text: String = raw
        .trim()
        .chars()
        .filter(|c| !is_currency_char(*c))
        .collect();

    // Currency codes such as RWF, Frw or USD on either side
    text = text
        .trim_matches(|c: char| c.is_alphabetic() || c.is_whitespace())
        .to_string();
    if text.is_empty() {
        return Err("empty value".to_string());
    }

    let mut negative = false;
    if text.starts_with('(') && text.ends_with(')') {
        negative = true;
        text = text[1..text.len() - 1]
            .trim_matches(|c: char| c.is_alphabetic() || c.is_whitespace())
            .to_string();
    }
    if let Some(rest) = text.strip_suffix('-') {
        negative = !negative;
        text = rest.trim().to_string();
    }
    if let Some(rest) = text.strip_prefix('-') {
        negative = !negative;
        text = rest.trim().to_string();
    } else if let Some(rest) = text.strip_prefix('+') {
        text = rest.trim().to_string();
    }

    let thousands = if decimal_separator == ',' { '.' } else { ',' };
    let mut cleaned = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_ascii_digit() => cleaned.push(c),
            c if c == decimal_separator => cleaned.push('.'),
            c if c == thousands => {}
            ' ' | '\u{00A0}' | '\u{202F}' | '\'' => {}
            other => return Err(format!("unexpected character '{other}'")),
        }
    }
    if cleaned.is_empty() || cleaned == "." {
        return Err("no digits".to_string());
    }

    let value = Decimal::from_str(&cleaned).map_err(|e| e.to_string())?;
    Ok(if negative { -value } else { value })
}

/// Resolves an amount cell. Native numbers are taken through their shortest text form so
/// binary float noise never leaks into the decimal.
pub fn parse_amount_cell(cell: &CellValue, locale: Locale) -> std::result::Result<Decimal, String> {
    match cell {
        CellValue::Number(n) => {
            if !n.is_finite() {
                return Err("non-finite number".to_string());
            }
            Decimal::from_str(&n.to_string())
                .or_else(|_| Decimal::from_scientific(&format!("{n:e}")))
                .map_err(|e| e.to_string())
        }
        CellValue::Text(s) => parse_amount(s, locale.decimal_separator()),
        CellValue::Empty => Err("empty value".to_string()),
        CellValue::Date(_) => Err("date where an amount was expected".to_string()),
        CellValue::Error(e) => Err(format!("spreadsheet error {e}")),
    }
}
