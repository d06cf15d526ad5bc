//! # Date utilities
//!
//! This module yields utilities for working with calendar dates represented as strings of the form YYYY-MM-DD,
//! and with the half-open date ranges reservations are distributed over.
//!

use std::{fmt, sync::OnceLock};

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

/// The format used for dates at every boundary of our applications.
pub const YMD_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DateError {
    #[error("the supplied string {0:?} is not of the form YYYY-MM-DD")]
    Malformed(String),
    #[error("{0:?} is not a valid calendar date")]
    Invalid(String),
    #[error("the end date {end} lies before the start date {start}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

fn ymd_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("static date pattern"))
}

/// Parses a string of the form YYYY-MM-DD into a calendar date.
///
/// Unlike `NaiveDate::parse_from_str` this rejects unpadded months and days, so every
/// accepted string round-trips through [`format_ymd`] unchanged.
pub fn parse_ymd(date_ymd: &str) -> Result<NaiveDate, DateError> {
    let date_ymd = date_ymd.trim();
    if !ymd_regex().is_match(date_ymd) {
        return Err(DateError::Malformed(date_ymd.to_string()));
    }
    NaiveDate::parse_from_str(date_ymd, YMD_FORMAT).map_err(|_| DateError::Invalid(date_ymd.to_string()))
}

/// Formats a date as YYYY-MM-DD.
pub fn format_ymd(date: NaiveDate) -> String {
    date.format(YMD_FORMAT).to_string()
}

/// A range of calendar dates. The start date is the first night that can be booked and
/// the end date is the last possible checkout, so the range covers `num_days` nights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// A range where `start == end` is allowed, it simply has no nights.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateError> {
        if end < start {
            return Err(DateError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses both bounds from strings of the form YYYY-MM-DD.
    pub fn parse(start_ymd: &str, end_ymd: &str) -> Result<Self, DateError> {
        Self::new(parse_ymd(start_ymd)?, parse_ymd(end_ymd)?)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// The number of nights in the range, i.e. the days between start and end excluding the end date itself.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", format_ymd(self.start), format_ymd(self.end))
    }
}
