//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! Three bands (separate Indicator instances):
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses population stddev (divide by N). Close-only, so bars without a
//! high/low still get bands.
//! Lookback: period - 1.

use super::{closes, Indicator};
use crate::domain::PriceBar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

impl BollingerBand {
    fn label(&self) -> &'static str {
        match self {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "mid",
            BollingerBand::Lower => "lower",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        Self {
            period,
            multiplier,
            band,
            name: format!("bb_{}_{period}_{multiplier}", band.label()),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }

    /// All three bands in one pass: (upper, middle, lower).
    pub fn bands(period: usize, multiplier: f64, bars: &[PriceBar]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let closes = closes(bars);
        let n = closes.len();
        let mut upper = vec![f64::NAN; n];
        let mut middle = vec![f64::NAN; n];
        let mut lower = vec![f64::NAN; n];

        if period == 0 || n < period {
            return (upper, middle, lower);
        }

        for i in (period - 1)..n {
            if let Some((mean, stddev)) = window_stats(&closes[(i + 1 - period)..=i]) {
                middle[i] = mean;
                upper[i] = mean + multiplier * stddev;
                lower[i] = mean - multiplier * stddev;
            }
        }

        (upper, middle, lower)
    }
}

/// Mean and population standard deviation, `None` if the window has a NaN.
fn window_stats(window: &[f64]) -> Option<(f64, f64)> {
    if window.iter().any(|v| v.is_nan()) {
        return None;
    }
    let len = window.len() as f64;
    let mean = window.iter().sum::<f64>() / len;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / len;
    Some((mean, variance.sqrt()))
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        let (upper, middle, lower) = Self::bands(self.period, self.multiplier, bars);
        match self.band {
            BollingerBand::Upper => upper,
            BollingerBand::Middle => middle,
            BollingerBand::Lower => lower,
        }
    }
}
