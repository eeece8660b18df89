//! Loose date and date-range parsing
//!
//! Filter values arrive straight from query strings and stored records use
//! whatever format the form that wrote them used, so both sides go through
//! the same permissive parser.
//!
//! Accepted shapes:
//! - `YYYY/MM/DD`, `YYYY/M/D`
//! - `YYYY-MM-DD`, `YYYY-M-D`
//! - `MM/DD/YYYY`, `M/D/YYYY`
//! - RFC 3339 timestamps (only the calendar date is kept)

use chrono::{DateTime, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;

/// Separator between the two ends of a range (`2022/10/01-2022/12/15`)
pub const RANGE_SEPARATOR: char = '-';

/// Which capture group holds the year, month and day
struct DateShape {
    pattern: Regex,
    year: usize,
    month: usize,
    day: usize,
}

fn date_shapes() -> &'static [DateShape] {
    static SHAPES: OnceLock<Vec<DateShape>> = OnceLock::new();
    SHAPES.get_or_init(|| {
        vec![
            DateShape {
                pattern: Regex::new(r"^(\d{4})/(\d{1,2})/(\d{1,2})$").unwrap(),
                year: 1,
                month: 2,
                day: 3,
            },
            DateShape {
                pattern: Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").unwrap(),
                year: 1,
                month: 2,
                day: 3,
            },
            DateShape {
                pattern: Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap(),
                year: 3,
                month: 1,
                day: 2,
            },
        ]
    })
}

/// Parse a loosely formatted calendar date
///
/// Returns `None` for anything that is not one of the accepted shapes or
/// that names an impossible day (`2021/02/30`).
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();

    for shape in date_shapes() {
        if let Some(caps) = shape.pattern.captures(input) {
            let year = caps[shape.year].parse().ok()?;
            let month = caps[shape.month].parse().ok()?;
            let day = caps[shape.day].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Inclusive calendar range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Parse `"<start>-<end>"`
///
/// The input is split on every `-`; only the first two pieces are used, so
/// dash-separated dates (`2021-06-07`) cannot appear inside a range.
/// Fewer than two pieces, or either piece failing [`parse_date`], yields `None`.
pub fn parse_date_range(input: &str) -> Option<DateRange> {
    let parts: Vec<&str> = input.split(RANGE_SEPARATOR).collect();
    if parts.len() < 2 {
        return None;
    }

    Some(DateRange {
        start: parse_date(parts[0])?,
        end: parse_date(parts[1])?,
    })
}
