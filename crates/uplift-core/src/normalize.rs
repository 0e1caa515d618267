//! Normalization of loosely formatted spreadsheet cells
//!
//! Every function here is total: unparseable input degrades to a default
//! (0, `None`, empty string) instead of failing.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::{CellValue, Record};

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Look up a field by candidate header names
///
/// Exact header match is tried first for every candidate, then a match that
/// ignores case and everything but ASCII letters and digits, so `Promotion ID`,
/// `promotion_id` and `PromotionID` all resolve. A header that is present wins
/// even when its cell is blank.
pub fn find_field<'a>(record: &'a Record, candidates: &[&str]) -> Option<&'a CellValue> {
    for key in candidates {
        if let Some(value) = record.get(key) {
            return Some(value);
        }
    }

    for key in candidates {
        let wanted = normalize_key(key);
        if let Some((_, value)) = record.iter().find(|(k, _)| normalize_key(k) == wanted) {
            return Some(value);
        }
    }

    None
}

/// [`find_field`], with a missing field read as an empty cell
pub fn field<'a>(record: &'a Record, candidates: &[&str]) -> &'a CellValue {
    find_field(record, candidates).unwrap_or(&EMPTY_CELL)
}

/// Lower-cased, alphanumeric-only form of a header
pub fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Text of a cell, with blank cells (empty, zero, false) read as ""
pub fn cell_text(value: &CellValue) -> String {
    if value.is_blank() {
        String::new()
    } else {
        value.as_text()
    }
}

/// Parse an amount, keeping only digits, `.` and `-`
///
/// `"$1,234.50"` becomes 1234.5. The longest leading number is used, so
/// `"12-3"` reads as 12. Anything unparseable is 0.
pub fn parse_amount(value: &CellValue) -> f64 {
    match value {
        CellValue::Number(n) if n.is_finite() => *n,
        CellValue::Text(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                .collect();
            leading_number(&cleaned)
        }
        _ => 0.0,
    }
}

fn leading_number(s: &str) -> f64 {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let int_digits = end - int_start;

    let mut frac_digits = 0;
    if end < bytes.len() && bytes[end] == b'.' {
        let dot = end;
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            frac_digits += 1;
        }
        if frac_digits == 0 {
            end = dot;
        }
    }

    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    s[..end]
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

/// Date-only formats, two-digit years before four-digit ones
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // 2024-01-15
    "%m/%d/%y", // 01/15/24
    "%m/%d/%Y", // 01/15/2024
    "%m-%d-%Y", // 01-15-2024
    "%Y/%m/%d", // 2024/01/15
    "%b %d, %Y", // Jan 15, 2024
    "%B %d, %Y", // January 15, 2024
    "%d %b %Y", // 15 Jan 2024
    "%d %B %Y", // 15 January 2024
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a date cell
///
/// Cells already holding a date are returned as-is. Text is tried against
/// ISO dates and date-times, RFC 3339 / RFC 2822, common US spreadsheet
/// layouts, then year-month and bare-year text; only the calendar date is
/// kept. Numbers are not dates.
pub fn parse_date(value: &CellValue) -> Option<NaiveDate> {
    match value {
        CellValue::Date(d) => Some(*d),
        CellValue::Text(s) => parse_date_text(s),
        _ => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // A trailing "Z" without seconds precision, e.g. 2024-01-15T00:00Z
    if let Some(stripped) = s.strip_suffix('Z') {
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(stripped, fmt) {
                return Some(dt.date());
            }
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }

    parse_partial_date(s)
}

/// Year-month (`2024-03`) or bare year (`2024`) text, pinned to the first day
fn parse_partial_date(s: &str) -> Option<NaiveDate> {
    let (year, month) = match s.split_once('-') {
        Some((year, month)) => (year, month),
        None => (s, "1"),
    };
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if month.is_empty() || month.len() > 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// Trim and strip leading zeros from a UPC
pub fn normalize_upc(value: &str) -> String {
    value.trim().trim_start_matches('0').to_string()
}

/// Trim, lower-case and strip leading zeros from a SAP material number
///
/// SAP pads material numbers (`000000513040`) while FI exports often don't
/// (`513040`); both must key the same material.
pub fn normalize_material(value: &str) -> String {
    value.trim().to_lowercase().trim_start_matches('0').to_string()
}

/// [`normalize_upc`] over a cell
pub fn upc_of(value: &CellValue) -> String {
    normalize_upc(&cell_text(value))
}

/// [`normalize_material`] over a cell
pub fn material_of(value: &CellValue) -> String {
    normalize_material(&cell_text(value))
}
