use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;
use std::str::FromStr;

use crate::ScribeError;

/// Date format used by every period shape (`MM/DD/YYYY`)
const DATE_FORMAT: &str = "%m/%d/%Y";

/// Survey period selected by the user.
///
/// Textual forms:
/// - `all`
/// - `b-MM/DD/YYYY` (published on or before the date)
/// - `MM/DD/YYYY-e` (published on or after the date)
/// - `MM/DD/YYYY-MM/DD/YYYY` (both bounds inclusive, start <= end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Before(NaiveDate),
    After(NaiveDate),
    Between(NaiveDate, NaiveDate),
}

impl Period {
    /// Build a closed range, rejecting `start > end`
    pub fn between(start: NaiveDate, end: NaiveDate) -> Result<Self, ScribeError> {
        if start > end {
            return Err(ScribeError::InvalidPeriod(format!(
                "start date {} is after end date {}",
                start.format(DATE_FORMAT),
                end.format(DATE_FORMAT)
            )));
        }
        Ok(Period::Between(start, end))
    }

    /// Check whether a calendar date falls inside the period
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match *self {
            Period::All => true,
            Period::Before(end) => date <= end,
            Period::After(start) => date >= start,
            Period::Between(start, end) => start <= date && date <= end,
        }
    }

    /// Check whether a raw publish timestamp falls inside the period.
    ///
    /// A missing or unparsable timestamp always matches, so a formatting problem upstream
    /// never drops a video silently.
    pub fn matches(&self, published_at: Option<&str>) -> bool {
        if *self == Period::All {
            return true;
        }

        match published_at.and_then(publish_date) {
            Some(date) => self.contains_date(date),
            None => true,
        }
    }
}

/// UTC calendar date of an RFC 3339 timestamp such as `2023-04-01T12:30:00Z`
pub fn publish_date(timestamp: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).date_naive())
}

/// Parse a strict `MM/DD/YYYY` date: two-digit month and day, four-digit year
fn parse_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    if bytes.len() != 10 {
        return None;
    }

    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        2 | 5 => *b == b'/',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT).ok()
}

impl FromStr for Period {
    type Err = ScribeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScribeError::InvalidPeriod(s.to_string());

        if s == "all" {
            return Ok(Period::All);
        }

        if let Some(date) = s.strip_prefix("b-") {
            return parse_date(date).map(Period::Before).ok_or_else(invalid);
        }

        if let Some(date) = s.strip_suffix("-e") {
            return parse_date(date).map(Period::After).ok_or_else(invalid);
        }

        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = parse_date(start).ok_or_else(invalid)?;
        let end = parse_date(end).ok_or_else(invalid)?;

        Period::between(start, end)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::All => write!(f, "all"),
            Period::Before(end) => write!(f, "b-{}", end.format(DATE_FORMAT)),
            Period::After(start) => write!(f, "{}-e", start.format(DATE_FORMAT)),
            Period::Between(start, end) => {
                write!(f, "{}-{}", start.format(DATE_FORMAT), end.format(DATE_FORMAT))
            }
        }
    }
}
