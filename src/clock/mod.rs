//! Calendar dates used across the pipeline

use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Duration, Month, OffsetDateTime, Weekday};

use crate::error::IndexError;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

///[Date] is a wrapper around a calendar date from the time package. Prices are daily closes so
///nothing in the pipeline needs a time of day.
//The internal representation with the time package should remain hidden from clients, this keeps
//the option to change the dependency later.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub struct Date(time::Date);

impl Date {
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, IndexError> {
        let invalid = || IndexError::InvalidDate {
            value: format!("{year}-{month}-{day}"),
        };
        let month = Month::try_from(month).map_err(|_| invalid())?;
        let date = time::Date::from_calendar_date(year, month, day).map_err(|_| invalid())?;
        Ok(Self(date))
    }

    /// Parses `YYYY-MM-DD`.
    pub fn from_date_string(val: &str) -> Result<Self, IndexError> {
        time::Date::parse(val.trim(), DATE_FORMAT)
            .map(Self)
            .map_err(|_| IndexError::InvalidDate { value: val.into() })
    }

    /// Date in UTC of the given epoch seconds.
    pub fn from_unix_timestamp(val: i64) -> Option<Self> {
        OffsetDateTime::from_unix_timestamp(val)
            .ok()
            .map(|dt| Self(dt.date()))
    }

    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    /// Epoch seconds at midnight UTC.
    pub fn unix_timestamp(&self) -> i64 {
        self.0.midnight().assume_utc().unix_timestamp()
    }

    /// `None` when the result falls outside the supported calendar.
    pub fn minus_days(&self, days: i64) -> Option<Self> {
        self.0.checked_sub(Duration::days(days)).map(Self)
    }

    pub fn plus_days(&self, days: i64) -> Option<Self> {
        self.0.checked_add(Duration::days(days)).map(Self)
    }

    /// Whole days from this date to `other`, negative when `other` is earlier.
    pub fn days_until(&self, other: &Date) -> i64 {
        (other.0 - self.0).whole_days()
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.0.weekday(), Weekday::Saturday | Weekday::Sunday)
    }

    /// Latest weekday strictly before this date.
    pub fn previous_weekday(&self) -> Option<Self> {
        let mut date = self.minus_days(1)?;
        while date.is_weekend() {
            date = date.minus_days(1)?;
        }
        Some(date)
    }
}

impl Deref for Date {
    type Target = time::Date;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<time::Date> for Date {
    fn from(value: time::Date) -> Self {
        Self(value)
    }
}

impl From<Date> for time::Date {
    fn from(value: Date) -> Self {
        value.0
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.format(DATE_FORMAT) {
            Ok(formatted) => f.write_str(&formatted),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for Date {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::from_date_string(s)
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Date::from_date_string(&raw).map_err(de::Error::custom)
    }
}

/// How the "previous" date of a request is derived from the selected date.
///
/// The default steps back one calendar day even though prices are later snapped to the nearest
/// prior trading day, so a Monday request compares against Sunday which resolves to Friday.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PreviousDate {
    #[default]
    CalendarDay,
    TradingDay,
}

impl PreviousDate {
    pub fn apply(&self, selected: Date) -> Result<Date, IndexError> {
        let previous = match self {
            PreviousDate::CalendarDay => selected.minus_days(1),
            PreviousDate::TradingDay => selected.previous_weekday(),
        };
        previous.ok_or_else(|| IndexError::InvalidDate {
            value: selected.to_string(),
        })
    }
}

/// Used to build the list of dates a trend series is computed over.
pub struct DateRange {
    pub start: Date,
    pub end: Date,
    skip_weekends: bool,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, IndexError> {
        if start > end {
            return Err(IndexError::InvalidRange { start, end });
        }
        Ok(Self {
            start,
            end,
            skip_weekends: false,
        })
    }

    pub fn weekdays_only(mut self) -> Self {
        self.skip_weekends = true;
        self
    }

    //Inclusive of both ends
    pub fn dates(&self) -> Vec<Date> {
        let mut dates = Vec::new();
        let mut curr = self.start;
        while curr <= self.end {
            if !(self.skip_weekends && curr.is_weekend()) {
                dates.push(curr);
            }
            let Some(next) = curr.plus_days(1) else {
                break;
            };
            curr = next;
        }
        dates
    }
}

#[cfg(test)]
mod tests {
    use super::{Date, DateRange, PreviousDate};

    #[test]
    fn test_that_date_string_round_trips_through_display() {
        let date = Date::from_date_string("2024-09-05").unwrap();
        assert_eq!(date.to_string(), "2024-09-05");
        assert_eq!(date, Date::from_ymd(2024, 9, 5).unwrap());
    }

    #[test]
    fn test_that_bad_date_strings_are_rejected() {
        assert!(Date::from_date_string("2024/09/05").is_err());
        assert!(Date::from_date_string("2024-13-01").is_err());
        assert!(Date::from_ymd(2023, 2, 29).is_err());
    }

    #[test]
    fn test_that_previous_date_policies_differ_on_monday() {
        //Monday
        let monday = Date::from_ymd(2024, 9, 9).unwrap();
        assert_eq!(
            PreviousDate::CalendarDay.apply(monday).unwrap(),
            Date::from_ymd(2024, 9, 8).unwrap()
        );
        assert_eq!(
            PreviousDate::TradingDay.apply(monday).unwrap(),
            Date::from_ymd(2024, 9, 6).unwrap()
        );
    }

    #[test]
    fn test_that_unix_timestamp_is_midnight_utc() {
        let date = Date::from_ymd(1970, 1, 2).unwrap();
        assert_eq!(date.unix_timestamp(), 86_400);
        assert_eq!(Date::from_unix_timestamp(86_400 + 3_600), Some(date));
    }

    #[test]
    fn test_that_range_skips_weekends() {
        let start = Date::from_ymd(2024, 9, 5).unwrap();
        let end = Date::from_ymd(2024, 9, 10).unwrap();
        let all = DateRange::new(start, end).unwrap().dates();
        assert_eq!(all.len(), 6);

        let weekdays = DateRange::new(start, end).unwrap().weekdays_only().dates();
        assert_eq!(weekdays.len(), 4);
        assert!(weekdays.iter().all(|d| !d.is_weekend()));
    }

    #[test]
    fn test_that_arithmetic_at_calendar_edges_does_not_overflow() {
        let last = Date::from_ymd(9999, 12, 31).unwrap();
        assert_eq!(last.plus_days(1), None);
        assert_eq!(last.minus_days(1), Date::from_ymd(9999, 12, 30).ok());

        let first = Date::from(time::Date::MIN);
        assert_eq!(first.minus_days(1), None);
        assert!(PreviousDate::CalendarDay.apply(first).is_err());
        assert!(PreviousDate::TradingDay.apply(first).is_err());
    }

    #[test]
    fn test_that_range_ending_on_last_date_terminates() {
        let start = Date::from_ymd(9999, 12, 29).unwrap();
        let end = Date::from_ymd(9999, 12, 31).unwrap();
        let dates = DateRange::new(start, end).unwrap().dates();
        assert_eq!(dates.len(), 3);
        assert_eq!(dates.last(), Some(&end));
        assert_eq!(start.days_until(&end), 2);
    }

    #[test]
    fn test_that_inverted_range_is_rejected() {
        let start = Date::from_ymd(2024, 9, 10).unwrap();
        let end = Date::from_ymd(2024, 9, 5).unwrap();
        assert!(DateRange::new(start, end).is_err());
    }
}
