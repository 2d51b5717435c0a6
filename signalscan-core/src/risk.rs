//! ATR-based risk plan for the last row of a frame.
//!
//! ```text
//! BUY:  stop = close - stop_mult * ATR    target = close + target_mult * ATR
//! SELL: stop = close + stop_mult * ATR    target = close - target_mult * ATR
//! size = capital * risk_fraction / |close - stop|
//! ```
//!
//! Missing inputs give `None`, never a zero plan: a zero would read as a
//! valid zero-risk trade.

use crate::engine::IndicatorRow;
use crate::signal::Signal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stop distances at or below this are treated as zero.
pub const MIN_STOP_DISTANCE: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum RiskParamsError {
    #[error("capital must be positive (got {0})")]
    Capital(f64),
    #[error("risk_fraction must be in (0, 1] (got {0})")]
    RiskFraction(f64),
    #[error("{name} must be positive (got {value})")]
    Multiple { name: &'static str, value: f64 },
}

/// Account and stop/target settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskParams {
    pub capital: f64,
    /// Share of capital at risk per trade (0.02 = 2%).
    pub risk_fraction: f64,
    pub stop_atr_multiple: f64,
    pub target_atr_multiple: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            capital: 1000.0,
            risk_fraction: 0.02,
            stop_atr_multiple: 1.0,
            target_atr_multiple: 2.0,
        }
    }
}

impl RiskParams {
    pub fn new(capital: f64, risk_fraction: f64) -> Self {
        Self {
            capital,
            risk_fraction,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), RiskParamsError> {
        if !(self.capital.is_finite() && self.capital > 0.0) {
            return Err(RiskParamsError::Capital(self.capital));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction <= 1.0) {
            return Err(RiskParamsError::RiskFraction(self.risk_fraction));
        }
        for (name, value) in [
            ("stop_atr_multiple", self.stop_atr_multiple),
            ("target_atr_multiple", self.target_atr_multiple),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(RiskParamsError::Multiple { name, value });
            }
        }
        Ok(())
    }

    /// Dollars at risk per trade.
    pub fn risk_budget(&self) -> f64 {
        self.capital * self.risk_fraction
    }
}

/// Entry, exits, and size for one trade idea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskPlan {
    pub side: Signal,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    /// `None` when the stop sits on the entry (ATR ~ 0).
    pub position_size: Option<f64>,
}

impl RiskPlan {
    /// Reward-to-risk ratio, `None` when the stop distance is degenerate.
    pub fn reward_risk(&self) -> Option<f64> {
        let risk = (self.entry_price - self.stop_loss).abs();
        (risk > MIN_STOP_DISTANCE).then(|| (self.take_profit - self.entry_price).abs() / risk)
    }
}

/// Build the plan for `last_row` given its signal.
///
/// Requires a defined ATR and an actionable signal; HOLD gives `None`.
pub fn risk_plan(last_row: &IndicatorRow, signal: Signal, params: &RiskParams) -> Option<RiskPlan> {
    let entry = last_row.close();
    let atr = last_row.atr?;
    if !entry.is_finite() || !atr.is_finite() {
        return None;
    }

    let stop_distance = params.stop_atr_multiple * atr;
    let target_distance = params.target_atr_multiple * atr;

    let (stop_loss, take_profit) = match signal {
        Signal::Buy => (entry - stop_distance, entry + target_distance),
        Signal::Sell => (entry + stop_distance, entry - target_distance),
        Signal::Hold => return None,
    };

    let denominator = (entry - stop_loss).abs();
    let position_size =
        (denominator > MIN_STOP_DISTANCE).then(|| params.risk_budget() / denominator);

    Some(RiskPlan {
        side: signal,
        entry_price: entry,
        stop_loss,
        take_profit,
        position_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PriceBar;
    use crate::indicators::assert_approx;
    use chrono::{TimeZone, Utc};

    fn row(close: f64, atr: Option<f64>) -> IndicatorRow {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let mut r = IndicatorRow::bare(PriceBar::close_only(t, close));
        r.atr = atr;
        r
    }

    #[test]
    fn buy_plan() {
        let plan = risk_plan(&row(159.0, Some(2.0)), Signal::Buy, &RiskParams::new(1000.0, 0.02))
            .unwrap();
        assert_approx(plan.stop_loss, 157.0, 1e-12);
        assert_approx(plan.take_profit, 163.0, 1e-12);
        // 20 / 2 = 10
        assert_approx(plan.position_size.unwrap(), 10.0, 1e-12);
        assert_approx(plan.reward_risk().unwrap(), 2.0, 1e-12);
    }

    #[test]
    fn sell_plan() {
        let plan = risk_plan(&row(50.0, Some(1.5)), Signal::Sell, &RiskParams::new(1000.0, 0.02))
            .unwrap();
        assert_approx(plan.stop_loss, 51.5, 1e-12);
        assert_approx(plan.take_profit, 47.0, 1e-12);
        assert!(plan.stop_loss > plan.entry_price && plan.entry_price > plan.take_profit);
    }

    #[test]
    fn hold_has_no_plan() {
        assert!(risk_plan(&row(50.0, Some(1.5)), Signal::Hold, &RiskParams::default()).is_none());
    }

    #[test]
    fn missing_atr_has_no_plan() {
        assert!(risk_plan(&row(50.0, None), Signal::Buy, &RiskParams::default()).is_none());
    }

    #[test]
    fn zero_atr_leaves_size_undefined() {
        let plan = risk_plan(&row(50.0, Some(0.0)), Signal::Buy, &RiskParams::default()).unwrap();
        assert_eq!(plan.position_size, None);
        assert_eq!(plan.reward_risk(), None);
    }

    #[test]
    fn custom_multiples() {
        let params = RiskParams {
            stop_atr_multiple: 2.0,
            target_atr_multiple: 3.0,
            ..RiskParams::new(10_000.0, 0.01)
        };
        let plan = risk_plan(&row(100.0, Some(4.0)), Signal::Buy, &params).unwrap();
        assert_approx(plan.stop_loss, 92.0, 1e-12);
        assert_approx(plan.take_profit, 112.0, 1e-12);
        // 100 / 8
        assert_approx(plan.position_size.unwrap(), 12.5, 1e-12);
    }

    #[test]
    fn validate_params() {
        assert!(RiskParams::default().validate().is_ok());
        assert_eq!(
            RiskParams::new(0.0, 0.02).validate(),
            Err(RiskParamsError::Capital(0.0))
        );
        assert!(matches!(
            RiskParams::new(1000.0, 1.5).validate(),
            Err(RiskParamsError::RiskFraction(_))
        ));
    }
}
