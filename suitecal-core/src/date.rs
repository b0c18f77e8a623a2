//! Date-only calendar values.
//!
//! Feeds carry all-day bookings, so everything downstream works on plain
//! (year, month, day) dates. Time of day and timezone are dropped at parse time.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A calendar day with no time component.
///
/// Serializes as ISO `YYYY-MM-DD`; ordering is chronological, which is also
/// the lexical order of the ISO form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(CalendarDate)
    }

    pub fn naive(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn day(&self) -> u32 {
        self.0.day()
    }

    /// The following day, or None past chrono's supported range.
    pub fn succ(&self) -> Option<Self> {
        self.0.checked_add_days(Days::new(1)).map(CalendarDate)
    }

    /// Parse a feed date value.
    ///
    /// Accepts a bare `YYYYMMDD` or `YYYYMMDDTHHMMSS` with an optional `Z`.
    /// Only the date part is kept.
    pub fn parse_feed_value(value: &str) -> Option<Self> {
        let value = value.trim();
        let (date, time) = match value.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (value, None),
        };

        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        if let Some(time) = time {
            let time = time.strip_suffix('Z').unwrap_or(time);
            if time.len() != 6 || !time.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
        }

        NaiveDate::parse_from_str(date, "%Y%m%d").ok().map(CalendarDate)
    }

    /// Every date in `[self, end_exclusive)`.
    pub fn iter_until(self, end_exclusive: CalendarDate) -> impl Iterator<Item = CalendarDate> {
        std::iter::successors(Some(self), |d| d.succ()).take_while(move |d| *d < end_exclusive)
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        CalendarDate(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = chrono::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").map(CalendarDate)
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
