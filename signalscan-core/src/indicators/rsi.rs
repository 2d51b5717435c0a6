//! Relative Strength Index (RSI).
//!
//! Simple-average form: over the trailing `period` close-to-close deltas,
//! RSI = 100 - 100 / (1 + mean(gains) / mean(losses)).
//! Lookback: period (needs `period` deltas, so `period + 1` closes).
//! Edge cases: mean loss == 0 → RSI = 100, including a flat series.

use super::{closes, Indicator};
use crate::domain::PriceBar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[PriceBar]) -> Vec<f64> {
        rsi_of_series(&closes(bars), self.period)
    }
}

/// RSI of an arbitrary close series.
pub fn rsi_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period + 1 {
        return result;
    }

    let deltas: Vec<f64> = (0..n)
        .map(|i| {
            if i == 0 {
                f64::NAN
            } else {
                values[i] - values[i - 1]
            }
        })
        .collect();

    for i in period..n {
        let window = &deltas[(i + 1 - period)..=i];
        if window.iter().any(|d| d.is_nan()) {
            continue;
        }
        let gain: f64 = window.iter().filter(|d| **d > 0.0).sum();
        let loss: f64 = window.iter().filter(|d| **d < 0.0).map(|d| -d).sum();
        result[i] = compute_rsi(gain / period as f64, loss / period as f64);
    }

    result
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-9);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_flat_series_is_100() {
        let result = rsi_of_series(&[100.0; 20], 14);
        assert!(result[..14].iter().all(|v| v.is_nan()));
        for v in &result[14..] {
            assert_approx(*v, 100.0, 1e-9);
        }
    }

    #[test]
    fn rsi_mixed_known_value() {
        // deltas: +0.34, -0.25, -0.48; gains 0.34, losses 0.73
        // RSI[3] = 100 - 100/(1 + 0.34/0.73)
        let result = rsi_of_series(&[44.0, 44.34, 44.09, 43.61, 44.33], 3);
        assert!(result[..3].iter().all(|v| v.is_nan()));
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
        // deltas at 4: -0.25, -0.48, +0.72
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + 0.72 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_needs_period_plus_one_closes() {
        assert!(rsi_of_series(&[1.0, 2.0, 3.0], 3).iter().all(|v| v.is_nan()));
        assert!(!rsi_of_series(&[1.0, 2.0, 3.0, 4.0], 3)[3].is_nan());
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 14);
    }
}
