//! Time windows and bucketing granularity.
//!
//! All timestamps are in one canonical zone (UTC); the engine never
//! performs time-zone conversion.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;

/// A half-open time range `[start, end)` over which orders are
/// considered.
///
/// `start == end` is a legal empty window and yields zero-valued (not
/// error) results downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, AnalyticsError> {
        if start > end {
            return Err(AnalyticsError::Validation(format!(
                "window start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Canonical window for a calendar month: first-of-month midnight
    /// up to (not including) first-of-next-month midnight.
    pub fn month(year: i32, month: u32) -> Result<Self, AnalyticsError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AnalyticsError::Validation(format!("invalid month {year}-{month}")))?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(|| AnalyticsError::Validation(format!("invalid month {year}-{month}")))?;
        Self::new(day_start(start), day_start(end))
    }

    /// Canonical window for a calendar year.
    pub fn year(year: i32) -> Result<Self, AnalyticsError> {
        let start = NaiveDate::from_ymd_opt(year, 1, 1)
            .ok_or_else(|| AnalyticsError::Validation(format!("invalid year {year}")))?;
        let end = NaiveDate::from_ymd_opt(year + 1, 1, 1)
            .ok_or_else(|| AnalyticsError::Validation(format!("invalid year {year}")))?;
        Self::new(day_start(start), day_start(end))
    }

    /// The single-day window containing `ts`.
    pub fn day_of(ts: DateTime<Utc>) -> Self {
        let start = day_start(ts.date_naive());
        Self {
            start,
            end: start + chrono::Duration::days(1),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Window length in (fractional) days.
    pub fn duration_days(&self) -> f64 {
        (self.end - self.start).num_seconds() as f64 / 86_400.0
    }
}

/// Midnight UTC at the start of `date`.
pub fn day_start(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// One unit of a time-grouped series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Granularity {
    pub fn parse(raw: Option<&str>) -> Result<Self, AnalyticsError> {
        match raw.map(str::trim) {
            None | Some("") | Some("day") => Ok(Self::Day),
            Some("week") => Ok(Self::Week),
            Some("month") => Ok(Self::Month),
            Some("quarter") => Ok(Self::Quarter),
            Some("year") => Ok(Self::Year),
            Some(other) => Err(AnalyticsError::Validation(format!(
                "unsupported granularity '{other}': expected day, week, month, quarter, or year"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Period key for the bucket containing `ts`.
    ///
    /// Labels sort lexicographically in chronological order: `2025-03-07`,
    /// `2025-W10` (ISO week), `2025-03`, `2025-Q1`, `2025`.
    pub fn bucket_label(&self, ts: DateTime<Utc>) -> String {
        match self {
            Self::Day => ts.format("%Y-%m-%d").to_string(),
            Self::Week => ts.format("%G-W%V").to_string(),
            Self::Month => ts.format("%Y-%m").to_string(),
            Self::Quarter => format!("{}-Q{}", ts.year(), ts.month0() / 3 + 1),
            Self::Year => ts.format("%Y").to_string(),
        }
    }
}
