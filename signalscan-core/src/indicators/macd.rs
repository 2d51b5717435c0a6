//! MACD histogram.
//!
//! line = EMA(fast) - EMA(slow), signal = EMA(signal) of the line,
//! histogram = line - signal. Standard parameters are 12/26/9.
//! Lookback: (slow - 1) + (signal - 1), i.e. 33 for the standard set.

use super::ema::ema_of_series;
use super::{closes, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct MacdHistogram {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl MacdHistogram {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_hist_{fast}_{slow}_{signal}"),
        }
    }

    pub fn standard() -> Self {
        Self::new(12, 26, 9)
    }

    /// MACD line (fast EMA minus slow EMA).
    pub fn line(&self, values: &[f64]) -> Vec<f64> {
        let fast = ema_of_series(values, self.fast);
        let slow = ema_of_series(values, self.slow);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }

    /// Histogram of an arbitrary close series.
    pub fn histogram(&self, values: &[f64]) -> Vec<f64> {
        let line = self.line(values);
        let signal = ema_of_series(&line, self.signal);
        line.iter().zip(&signal).map(|(l, s)| l - s).collect()
    }
}

impl Indicator for MacdHistogram {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.fast.max(self.slow).saturating_sub(1) + self.signal.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        self.histogram(&closes(bars))
    }
}
