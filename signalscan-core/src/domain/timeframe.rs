//! Lookback period and bar interval, in the short string form market-data
//! APIs use (`1y`, `1d`, `30m`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct TimeframeParseError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

/// How far back to load history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
        }
    }

    /// Calendar days covered.
    pub fn days(&self) -> i64 {
        match self {
            Period::OneMonth => 30,
            Period::ThreeMonths => 91,
            Period::SixMonths => 182,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1826,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::OneYear
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TimeframeParseError {
                kind: "period",
                value: s.to_string(),
                expected: "1mo, 3mo, 6mo, 1y, 2y, 5y",
            })
    }
}

/// Bar width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1h")]
    Hourly,
    #[serde(rename = "30m")]
    ThirtyMinutes,
}

impl Interval {
    pub const ALL: [Interval; 3] = [Interval::Daily, Interval::Hourly, Interval::ThirtyMinutes];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Hourly => "1h",
            Interval::ThirtyMinutes => "30m",
        }
    }

    pub fn duration(&self) -> chrono::Duration {
        match self {
            Interval::Daily => chrono::Duration::days(1),
            Interval::Hourly => chrono::Duration::hours(1),
            Interval::ThirtyMinutes => chrono::Duration::minutes(30),
        }
    }

    /// Bars per calendar day on a market that never closes.
    pub fn bars_per_day(&self) -> i64 {
        match self {
            Interval::Daily => 1,
            Interval::Hourly => 24,
            Interval::ThirtyMinutes => 48,
        }
    }

    pub fn is_intraday(&self) -> bool {
        !matches!(self, Interval::Daily)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Interval::Daily
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = TimeframeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TimeframeParseError {
                kind: "interval",
                value: s.to_string(),
                expected: "1d, 1h, 30m",
            })
    }
}
