//! PriceBar — one OHLCV observation for a single asset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one trading period.
///
/// `close` is always finite for a bar that made it into a [`PriceSeries`].
/// The other price fields are optional because some providers omit whole
/// columns (no high/low for an index, no volume for FX).
///
/// [`PriceSeries`]: super::PriceSeries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl PriceBar {
    /// Bar with every column present.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close,
            volume: Some(volume),
        }
    }

    /// Bar that only carries a close (line-chart style data).
    pub fn close_only(timestamp: DateTime<Utc>, close: f64) -> Self {
        Self {
            timestamp,
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    /// True when both high and low are present and finite.
    pub fn has_range(&self) -> bool {
        matches!((self.high, self.low), (Some(h), Some(l)) if h.is_finite() && l.is_finite())
    }

    /// High as f64, NaN when missing.
    pub fn high_or_nan(&self) -> f64 {
        self.high.filter(|v| v.is_finite()).unwrap_or(f64::NAN)
    }

    /// Low as f64, NaN when missing.
    pub fn low_or_nan(&self) -> f64 {
        self.low.filter(|v| v.is_finite()).unwrap_or(f64::NAN)
    }

    /// OHLC sanity check: high >= low and the close sits inside the range.
    /// Bars without a range are considered sane.
    pub fn is_sane(&self) -> bool {
        if !self.close.is_finite() {
            return false;
        }
        match (self.high, self.low) {
            (Some(h), Some(l)) => h >= l && self.close <= h && self.close >= l,
            _ => true,
        }
    }
}
