use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeekKeyError {
    #[error("Invalid date '{0}'. Use YYYY-MM-DD.")]
    InvalidFormat(String),
    #[error("Week key {0} is not a Monday")]
    NotMonday(NaiveDate),
}

fn iso_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static pattern is valid"))
}

pub fn parse_iso_date(value: &str) -> Result<NaiveDate, WeekKeyError> {
    if !iso_date_pattern().is_match(value) {
        return Err(WeekKeyError::InvalidFormat(value.to_string()));
    }
    NaiveDate::parse_from_str(value, ISO_DATE_FORMAT)
        .map_err(|_| WeekKeyError::InvalidFormat(value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WeekKey(NaiveDate);

impl WeekKey {
    pub fn new(monday: NaiveDate) -> Result<Self, WeekKeyError> {
        if monday.weekday() != Weekday::Mon {
            return Err(WeekKeyError::NotMonday(monday));
        }
        Ok(Self(monday))
    }

    pub fn containing(date: NaiveDate) -> Self {
        let days_from_monday = date.weekday().num_days_from_monday() as u64;
        Self(
            date.checked_sub_days(Days::new(days_from_monday))
                .unwrap_or(date),
        )
    }

    pub fn monday(&self) -> NaiveDate {
        self.0
    }

    pub fn sunday(&self) -> NaiveDate {
        self.0.checked_add_days(Days::new(6)).unwrap_or(self.0)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.0.iter_days().take(7)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.monday() && date <= self.sunday()
    }

    pub fn offset_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.0).num_days() as usize)
        } else {
            None
        }
    }

    pub fn next(&self) -> Option<Self> {
        self.0.checked_add_days(Days::new(7)).map(Self)
    }

    pub fn is_fragmented(&self) -> bool {
        self.monday().month() != self.sunday().month()
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(ISO_DATE_FORMAT))
    }
}

impl FromStr for WeekKey {
    type Err = WeekKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(parse_iso_date(s)?)
    }
}

impl TryFrom<String> for WeekKey {
    type Error = WeekKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WeekKey> for String {
    fn from(key: WeekKey) -> Self {
        key.to_string()
    }
}
