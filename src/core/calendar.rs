//! Calendar helpers - canonical `YYYY-MM-DD` days and `YYYY-MM` months.
//!
//! Dates are naive calendar days: no time zone is ever applied.

use crate::errors::{Error, Result};
use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// Parses a canonical zero-padded `YYYY-MM-DD` day.
///
/// # Errors
/// Returns [`Error::Validation`] for anything else.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.len() != 10 {
        return Err(invalid_date(input));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| invalid_date(input))
}

fn invalid_date(input: &str) -> Error {
    Error::Validation {
        message: format!("'{input}' is not a date in YYYY-MM-DD form"),
    }
}

/// A calendar month, the unit every report is computed over.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    first: NaiveDate,
}

impl YearMonth {
    /// Builds a month from a year and a 1-based month number.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if the month is outside 1..=12 or the year is out of range.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first| Self { first })
            .ok_or_else(|| Error::Validation {
                message: format!("{year}-{month} is not a valid month"),
            })
    }

    /// The month containing `date`.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date.with_day(1).unwrap_or(date),
        }
    }

    /// Parses a canonical `YYYY-MM` key.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] when the key is malformed.
    pub fn parse(key: &str) -> Result<Self> {
        let trimmed = key.trim();
        let invalid = || Error::Validation {
            message: format!("'{key}' is not a month in YYYY-MM form"),
        };
        let (year, month) = trimmed.split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }

    /// Year component.
    #[must_use]
    pub fn year(self) -> i32 {
        self.first.year()
    }

    /// 1-based month component.
    #[must_use]
    pub fn month(self) -> u32 {
        self.first.month()
    }

    /// First day of the month.
    #[must_use]
    pub const fn first_day(self) -> NaiveDate {
        self.first
    }

    /// Number of days in the month.
    #[must_use]
    pub fn days_in_month(self) -> u32 {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map_or(28, |last| last.day())
    }

    /// Every day of the month in order.
    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        let month = self.month();
        self.first.iter_days().take_while(move |day| day.month() == month)
    }

    /// Whether `date` falls inside this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    /// The previous month.
    #[must_use]
    pub fn previous(self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map_or(self, |first| Self { first })
    }

    /// The next month.
    #[must_use]
    pub fn next(self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map_or(self, |first| Self { first })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_date_canonical_only() {
        assert_eq!(
            parse_date("2024-05-03").unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 3).unwrap()
        );
        assert!(parse_date("2024-5-3").is_err());
        assert!(parse_date("03/05/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn test_month_key_is_zero_padded() {
        let month = YearMonth::new(2024, 3).unwrap();
        assert_eq!(month.to_string(), "2024-03");
        assert_eq!(YearMonth::parse("2024-03").unwrap(), month);
        assert!(YearMonth::parse("2024-3").is_err());
        assert!(YearMonth::parse("2024-13").is_err());
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(YearMonth::new(2024, 2).unwrap().days_in_month(), 29);
        assert_eq!(YearMonth::new(2023, 2).unwrap().days_in_month(), 28);
        assert_eq!(YearMonth::new(2024, 12).unwrap().days_in_month(), 31);
        assert_eq!(YearMonth::new(2024, 4).unwrap().days().count(), 30);
    }

    #[test]
    fn test_contains_and_navigation() {
        let month = YearMonth::new(2024, 1).unwrap();
        assert!(month.contains(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()));
        assert!(!month.contains(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()));
        assert_eq!(month.previous().to_string(), "2023-12");
        assert_eq!(month.next().to_string(), "2024-02");
    }
}
