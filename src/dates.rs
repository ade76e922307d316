//! Header-date extraction and calendar arithmetic.
//!
//! The FAR sheet carries two metadata dates in its first few rows: the
//! fiscal year end ("Year End - 31 March 2025") and the management-accounts
//! cutoff, which clients write in several shapes ("31/03/2025", "QMar'25",
//! "March 2025"). Both must be present or the run aborts before touching
//! any sheet.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use crate::error::{MaprepError, Result};
use crate::layout;
use crate::sheet::Sheet;

/// Year-end and management-period dates pulled from the FAR header rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeaderDates {
    pub year_end: NaiveDate,
    /// Month-end of the management-accounts cutoff.
    pub period_end: NaiveDate,
}

pub fn extract_header_dates(far: &Sheet) -> Result<HeaderDates> {
    let mut year_end = None;
    let mut period_end = None;

    let year_end_re = Regex::new(r"(\d{1,2} [A-Za-z]+ \d{4})").unwrap();

    for row in 0..layout::FAR_METADATA_ROWS {
        for col in 0..=far.max_col() {
            let text = far.text(row, col);
            if text.is_empty() {
                continue;
            }
            let lower = text.to_lowercase();
            if lower.contains("year end") && year_end.is_none() {
                if let Some(m) = year_end_re.captures(&text) {
                    year_end = NaiveDate::parse_from_str(&m[1], "%d %B %Y").ok();
                }
            }
            if lower.contains("management accounts") && period_end.is_none() {
                period_end = parse_period_token(&text);
            }
        }
    }

    let year_end = year_end.ok_or(MaprepError::MissingYearEnd)?;
    let period_end = period_end.ok_or(MaprepError::MissingManagementPeriod)?;
    Ok(HeaderDates { year_end, period_end })
}

/// Management-period token in priority order: dd/mm/yyyy, then Q<Mon>'yy,
/// then "Month yyyy". The first shape that parses wins.
fn parse_period_token(text: &str) -> Option<NaiveDate> {
    let dmy_re = Regex::new(r"(\d{1,2}/\d{1,2}/\d{4})").unwrap();
    if let Some(m) = dmy_re.captures(text) {
        if let Ok(d) = NaiveDate::parse_from_str(&m[1], "%d/%m/%Y") {
            return Some(d);
        }
    }

    let quarter_re = Regex::new(r"QE?\s*([A-Za-z]+)['\u{2019}]?(\d{2})").unwrap();
    if let Some(m) = quarter_re.captures(text) {
        let year: i32 = format!("20{}", &m[2]).parse().ok()?;
        if let Some(d) = parse_month_name(&m[1], year) {
            return Some(month_end(d));
        }
    }

    let month_year_re = Regex::new(r"([A-Za-z]+)\s+(\d{4})").unwrap();
    for m in month_year_re.captures_iter(text) {
        let year: i32 = m[2].parse().ok()?;
        if let Some(d) = parse_month_name(&m[1], year) {
            return Some(month_end(d));
        }
    }
    None
}

fn parse_month_name(name: &str, year: i32) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {name} {year}"), "%d %B %Y").ok()
}

/// Lenient date parse for transaction and asset-register cells stored as
/// text. Day-first formats, ISO, and long-form dates are accepted.
pub fn parse_loose_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%d/%m/%Y",
        "%d-%m-%Y",
        "%d.%m.%Y",
        "%d %B %Y",
        "%Y-%m-%d %H:%M:%S",
    ];
    for fmt in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }
    None
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let (y, m) = (date.year(), date.month());
    let first_next = if m == 12 {
        NaiveDate::from_ymd_opt(y + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(y, m + 1, 1).unwrap()
    };
    first_next - Duration::days(1)
}

/// First day of the month `n` months after (or before, if negative) the
/// month containing `date`.
pub fn add_months(date: NaiveDate, n: i32) -> NaiveDate {
    let total = date.year() * 12 + date.month() as i32 - 1 + n;
    let (y, m) = (total.div_euclid(12), total.rem_euclid(12) + 1);
    NaiveDate::from_ymd_opt(y, m as u32, 1).unwrap()
}

/// Whole months from the month of `from` to the month of `to`, inclusive of
/// both endpoints. Zero when `from` is in a later month than `to`.
pub fn months_inclusive(from: NaiveDate, to: NaiveDate) -> i64 {
    let span = (to.year() as i64 - from.year() as i64) * 12
        + (to.month() as i64 - from.month() as i64)
        + 1;
    span.max(0)
}
