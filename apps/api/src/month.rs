//! Calendar-month helpers shared by the matrix builder, metrics and evaluations.
//!
//! Months travel over the wire and through the monthly plan as `YYYY-MM` keys.

use chrono::{Datelike, Duration, NaiveDate};

/// Lowest and highest years that still format as four-digit `YYYY` keys.
pub const MIN_YEAR: i32 = 1;
pub const MAX_YEAR: i32 = 9999;

/// Formats the month containing `date` as `YYYY-MM`.
pub fn month_key(date: NaiveDate) -> String {
    date.format("%Y-%m").to_string()
}

/// Parses a `YYYY-MM` key into the first day of that month.
pub fn parse_month(key: &str) -> Option<NaiveDate> {
    let (year, month) = key.split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// The twelve `YYYY-MM` labels of `year`, January first.
/// Returns `None` for years outside `MIN_YEAR..=MAX_YEAR`.
pub fn month_columns(year: i32) -> Option<Vec<String>> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    (1..=12)
        .map(|m| NaiveDate::from_ymd_opt(year, m, 1).map(month_key))
        .collect()
}

/// First and last day of the month starting at `first`.
pub fn month_bounds(first: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = first.with_day(1).unwrap_or(first);
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next.map(|n| n - Duration::days(1)).unwrap_or(start);
    (start, end)
}

/// First and last day of `year`, for years in `MIN_YEAR..=MAX_YEAR`.
pub fn year_bounds(year: i32) -> Option<(NaiveDate, NaiveDate)> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    Some((
        NaiveDate::from_ymd_opt(year, 1, 1)?,
        NaiveDate::from_ymd_opt(year, 12, 31)?,
    ))
}

/// Monday-to-Sunday week containing `date`.
/// Returns `None` when the week runs past the calendar range `NaiveDate` can hold.
pub fn week_bounds(date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
    let offset = i64::from(date.weekday().num_days_from_monday());
    let start = date.checked_sub_signed(Duration::days(offset))?;
    let end = start.checked_add_signed(Duration::days(6))?;
    Some((start, end))
}

/// Zero-based month index (January = 0).
pub fn month_index(date: NaiveDate) -> usize {
    date.month0() as usize
}
