use std::fmt;
use std::str::FromStr;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use crate::error::AppError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A calendar day held as its fixed-width, zero-padded `YYYY-MM-DD` string.
///
/// Comparisons are plain string comparisons. That matches chronological order
/// only while every value has the same width, so the only way in is through
/// [`CalendarDate::parse`] (or [`CalendarDate::from_naive`]), which enforces it.
/// There is no time component and no timezone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CalendarDate(String);

impl CalendarDate {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes.iter().enumerate().all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

        if !well_formed || NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
            return Err(AppError::Validation(format!("Invalid date '{}', expected YYYY-MM-DD", value)));
        }
        Ok(Self(value.to_string()))
    }

    /// Fails for years outside `0000..=9999`, which would not format to
    /// ten characters.
    pub fn from_naive(date: NaiveDate) -> Result<Self, AppError> {
        Self::parse(&date.format(DATE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_naive(&self) -> Result<NaiveDate, AppError> {
        NaiveDate::parse_from_str(&self.0, DATE_FORMAT)
            .map_err(|_| AppError::Validation(format!("Invalid date '{}'", self.0)))
    }

    pub fn add_days(&self, days: i64) -> Result<Self, AppError> {
        let shifted = self
            .to_naive()?
            .checked_add_signed(Duration::days(days))
            .ok_or_else(|| AppError::Validation(format!("Date '{}' shifted by {} days is out of range", self.0, days)))?;
        Self::from_naive(shifted)
    }

    pub fn is_monday(&self) -> Result<bool, AppError> {
        Ok(self.to_naive()?.weekday() == Weekday::Mon)
    }

    /// Inclusive range check, `start <= self <= end`, by string order.
    pub fn is_within(&self, start: &CalendarDate, end: &CalendarDate) -> bool {
        start.0 <= self.0 && self.0 <= end.0
    }
}

/// The Monday strictly after `today`. On a Sunday that is tomorrow; on a
/// Monday it is a week out.
pub fn next_week_start(today: NaiveDate) -> Result<CalendarDate, AppError> {
    let days_ahead = 7 - today.weekday().num_days_from_monday() as i64;
    CalendarDate::from_naive(today)?.add_days(days_ahead)
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CalendarDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CalendarDate {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CalendarDate> for String {
    fn from(value: CalendarDate) -> Self {
        value.0
    }
}
