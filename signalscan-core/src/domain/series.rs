//! PriceSeries — the ordered bar history for one asset.
//!
//! Built from provider output with [`PriceSeries::from_raw`], which is the
//! only place provider-shaped data is flattened into the strict engine shape.

use super::bar::PriceBar;
use crate::data::RawBar;
use serde::{Deserialize, Serialize};

/// Ordered bars for one asset. Every bar has a finite close.
///
/// Timestamps are passed through as delivered: the series does not sort or
/// deduplicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub symbol: String,
    bars: Vec<PriceBar>,
}

/// What `from_raw` had to discard or could not find.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// Raw bars dropped because the close was missing or not a finite number.
    pub dropped_closes: usize,
    /// Retained bars that carry no usable high/low.
    pub missing_range: usize,
}

impl PriceSeries {
    /// Build a series from bars that are already clean.
    ///
    /// Bars with a non-finite close are dropped so the invariant holds even
    /// for hand-built input.
    pub fn new(symbol: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        let bars = bars.into_iter().filter(|b| b.close.is_finite()).collect();
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    /// Flatten provider bars into a series.
    pub fn from_raw(symbol: impl Into<String>, raw: Vec<RawBar>) -> (Self, NormalizeReport) {
        let mut report = NormalizeReport::default();
        let mut bars = Vec::with_capacity(raw.len());

        for r in raw {
            let close = match r.close {
                Some(c) if c.is_finite() => c,
                _ => {
                    report.dropped_closes += 1;
                    continue;
                }
            };
            let bar = PriceBar {
                timestamp: r.timestamp,
                open: r.open.filter(|v| v.is_finite()),
                high: r.high.filter(|v| v.is_finite()),
                low: r.low.filter(|v| v.is_finite()),
                close,
                volume: r.volume,
            };
            if !bar.has_range() {
                report.missing_range += 1;
            }
            bars.push(bar);
        }

        let series = Self {
            symbol: symbol.into(),
            bars,
        };
        (series, report)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// Close prices in bar order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// True when no bar carries a high/low range (the column is absent).
    pub fn lacks_range(&self) -> bool {
        !self.bars.is_empty() && self.bars.iter().all(|b| !b.has_range())
    }
}
