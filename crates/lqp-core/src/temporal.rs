//! # Temporal Types
//!
//! `Timestamp` is a UTC instant truncated to whole seconds. `PeriodType`
//! names the calendar unit a verification buckets by, and
//! [`PeriodType::units_between`] is the single definition of "how many whole
//! units separate two instants" used by the bucketer.
//!
//! Period arithmetic never consults the wall clock. Given the same event
//! timestamps and start date, every run produces the same period indices.

use std::str::FromStr;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::LiquidityError;

/// A UTC timestamp with seconds precision.
///
/// Serializes as `YYYY-MM-DDTHH:MM:SSZ`; deserializes through
/// [`Timestamp::parse`], so config files may use bare dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wrap a `DateTime<Utc>`, discarding sub-second components.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt.with_nanosecond(0).unwrap_or(dt))
    }

    /// Parse an ISO-8601 / RFC 3339 instant with any offset, normalizing
    /// to UTC. A bare date (`2025-03-31`) is read as midnight UTC.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Ok(Self::from_utc(dt.with_timezone(&Utc)));
        }
        chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Self(naive.and_utc()))
            .ok_or_else(|| format!("invalid ISO-8601 timestamp {s:?}"))
    }

    /// Construct from Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Option<Self> {
        DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Calendar unit used to bucket events into periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// 86 400-second days.
    Day,
    /// Seven days.
    Week,
    /// Calendar months.
    Month,
    /// Three calendar months.
    Quarter,
    /// Twelve calendar months.
    Year,
}

impl PeriodType {
    /// snake_case identifier, matching the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    /// Whole units of this period type from `start` to `t`.
    ///
    /// Negative when `t` precedes `start`. Uses floor semantics in both
    /// directions: a unit counts only once it has fully elapsed.
    pub fn units_between(&self, start: &Timestamp, t: &Timestamp) -> i64 {
        match self {
            Self::Day => whole_days(start, t),
            Self::Week => whole_days(start, t).div_euclid(7),
            Self::Month => whole_months(start, t),
            Self::Quarter => whole_months(start, t).div_euclid(3),
            Self::Year => whole_months(start, t).div_euclid(12),
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeriodType {
    type Err = LiquidityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(LiquidityError::config(format!("unknown period type {other:?}"))),
        }
    }
}

fn whole_days(start: &Timestamp, t: &Timestamp) -> i64 {
    (t.epoch_secs() - start.epoch_secs()).div_euclid(86_400)
}

/// Whole calendar months from `start` to `t`, floored.
///
/// The raw month difference counts a month as complete only once `t` has
/// reached `start`'s day-of-month and time-of-day. The same rule floors
/// instants before `start` (they land one month further back).
fn whole_months(start: &Timestamp, t: &Timestamp) -> i64 {
    let (a, b) = (start.as_datetime(), t.as_datetime());
    let raw = (b.year() as i64 - a.year() as i64) * 12 + (b.month() as i64 - a.month() as i64);
    let a_pos = (a.day(), a.num_seconds_from_midnight());
    let b_pos = (b.day(), b.num_seconds_from_midnight());
    if b_pos < a_pos {
        raw - 1
    } else {
        raw
    }
}
