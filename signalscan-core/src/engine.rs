//! Indicator pass: price series in, one [`IndicatorRow`] per bar out.
//!
//! Each indicator family is computed independently over the whole series and
//! is all-or-nothing: a family whose window the series cannot fill is
//! undefined on every row while the others may still be defined.

use crate::domain::{PriceBar, PriceSeries};
use crate::indicators::{Atr, Bollinger, Indicator, MacdHistogram, Rsi, Sma};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// What to do when the series is shorter than the longest window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Emit every row; warm-up fields stay undefined.
    #[default]
    Pad,
    /// Emit nothing unless every window can be filled at least once.
    Strict,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("{name} must be >= 1 (got {value})")]
    ZeroWindow { name: &'static str, value: usize },

    #[error("bb_stddev must be a positive finite number (got {0})")]
    BadMultiplier(f64),
}

/// Windows and multipliers for one indicator pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    pub fast_window: usize,
    pub slow_window: usize,
    pub rsi_window: usize,
    pub atr_window: usize,
    pub bb_window: usize,
    pub bb_stddev: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub history_policy: HistoryPolicy,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            fast_window: 50,
            slow_window: 200,
            rsi_window: 14,
            atr_window: 14,
            bb_window: 20,
            bb_stddev: 2.0,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            history_policy: HistoryPolicy::Pad,
        }
    }
}

impl IndicatorParams {
    /// Convenience constructor for the window set most callers vary.
    pub fn with_windows(
        fast_window: usize,
        slow_window: usize,
        rsi_window: usize,
        atr_window: usize,
        bb_window: usize,
        bb_stddev: f64,
    ) -> Self {
        Self {
            fast_window,
            slow_window,
            rsi_window,
            atr_window,
            bb_window,
            bb_stddev,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        let windows = [
            ("fast_window", self.fast_window),
            ("slow_window", self.slow_window),
            ("rsi_window", self.rsi_window),
            ("atr_window", self.atr_window),
            ("bb_window", self.bb_window),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(ParamsError::ZeroWindow { name, value });
            }
        }
        if !(self.bb_stddev.is_finite() && self.bb_stddev > 0.0) {
            return Err(ParamsError::BadMultiplier(self.bb_stddev));
        }
        Ok(())
    }

    /// Bars needed before every primary indicator (MACD excluded) is defined
    /// on the last row. RSI counts deltas, so it needs one extra close.
    pub fn min_history(&self) -> usize {
        self.fast_window
            .max(self.slow_window)
            .max(self.rsi_window + 1)
            .max(self.atr_window)
            .max(self.bb_window)
    }
}

/// A bar plus its derived indicator values. `None` means undefined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorRow {
    pub bar: PriceBar,
    pub sma_fast: Option<f64>,
    pub sma_slow: Option<f64>,
    pub rsi: Option<f64>,
    pub atr: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_lower: Option<f64>,
    pub macd_hist: Option<f64>,
}

impl IndicatorRow {
    /// Row with no derived values.
    pub fn bare(bar: PriceBar) -> Self {
        Self {
            bar,
            sma_fast: None,
            sma_slow: None,
            rsi: None,
            atr: None,
            bb_upper: None,
            bb_mid: None,
            bb_lower: None,
            macd_hist: None,
        }
    }

    pub fn close(&self) -> f64 {
        self.bar.close
    }

    /// True when no derived field is defined.
    pub fn is_warmup(&self) -> bool {
        [
            self.sma_fast,
            self.sma_slow,
            self.rsi,
            self.atr,
            self.bb_upper,
            self.bb_mid,
            self.bb_lower,
            self.macd_hist,
        ]
        .iter()
        .all(Option::is_none)
    }
}

fn defined(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Compute every indicator column for `series`.
///
/// Pure: the same input always yields the same rows. Empty input yields no
/// rows; under [`HistoryPolicy::Strict`] a series shorter than
/// [`IndicatorParams::min_history`] also yields no rows.
///
/// # Panics
/// If a window is zero. Call [`IndicatorParams::validate`] first when the
/// parameters come from user input.
pub fn compute_indicators(series: &PriceSeries, params: &IndicatorParams) -> Vec<IndicatorRow> {
    let bars = series.bars();
    if bars.is_empty() {
        return Vec::new();
    }
    if params.history_policy == HistoryPolicy::Strict && bars.len() < params.min_history() {
        debug!(
            symbol = %series.symbol,
            bars = bars.len(),
            needed = params.min_history(),
            "strict history policy: refusing partial output"
        );
        return Vec::new();
    }

    let sma_fast = Sma::new(params.fast_window).compute(bars);
    let sma_slow = Sma::new(params.slow_window).compute(bars);
    let rsi = Rsi::new(params.rsi_window).compute(bars);
    let atr = Atr::new(params.atr_window).compute(bars);
    let (bb_upper, bb_mid, bb_lower) = Bollinger::bands(params.bb_window, params.bb_stddev, bars);
    let macd_hist =
        MacdHistogram::new(params.macd_fast, params.macd_slow, params.macd_signal).compute(bars);

    debug!(symbol = %series.symbol, bars = bars.len(), "computed indicators");

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            bar: bar.clone(),
            sma_fast: defined(sma_fast[i]),
            sma_slow: defined(sma_slow[i]),
            rsi: defined(rsi[i]),
            atr: defined(atr[i]),
            bb_upper: defined(bb_upper[i]),
            bb_mid: defined(bb_mid[i]),
            bb_lower: defined(bb_lower[i]),
            macd_hist: defined(macd_hist[i]),
        })
        .collect()
}
