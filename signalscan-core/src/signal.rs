//! Per-row signal classification and buy-event edge detection.
//!
//! A row's signal depends only on that row's indicator values. The only
//! cross-row logic is the edge trigger, a one-step fold over the previous
//! row's buy flag.

use crate::engine::IndicatorRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical trading signal for one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Hold => "HOLD",
        }
    }

    pub fn is_actionable(&self) -> bool {
        !matches!(self, Signal::Hold)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One boolean trading check. Undefined inputs make a predicate false.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Fast SMA above slow SMA.
    Trend,
    /// RSI strictly below the ceiling (not overbought).
    RsiBelow { ceiling: f64 },
    /// MACD histogram strictly positive.
    MacdPositive,
    /// Close above the fast SMA.
    CloseAboveFast,
    /// Close above the lower Bollinger band.
    CloseAboveLowerBand,
}

impl Predicate {
    pub fn holds(&self, row: &IndicatorRow) -> bool {
        let close = row.close();
        match *self {
            Predicate::Trend => matches!((row.sma_fast, row.sma_slow), (Some(f), Some(s)) if f > s),
            Predicate::RsiBelow { ceiling } => row.rsi.is_some_and(|r| r < ceiling),
            Predicate::MacdPositive => row.macd_hist.is_some_and(|h| h > 0.0),
            Predicate::CloseAboveFast => row.sma_fast.is_some_and(|f| close > f),
            Predicate::CloseAboveLowerBand => row.bb_lower.is_some_and(|l| close > l),
        }
    }
}

/// Number of predicates that hold for `row`.
pub fn signal_score(row: &IndicatorRow, predicates: &[Predicate]) -> usize {
    predicates.iter().filter(|p| p.holds(row)).count()
}

/// A set of predicates and the score needed for BUY.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRule {
    pub predicates: Vec<Predicate>,
    pub threshold: usize,
}

impl SignalRule {
    pub const DEFAULT_RSI_CEILING: f64 = 60.0;
    pub const DEFAULT_THRESHOLD: usize = 3;

    /// Plain SMA crossover: the one-predicate case of the scored rule.
    pub fn crossover() -> Self {
        Self {
            predicates: vec![Predicate::Trend],
            threshold: 1,
        }
    }

    /// Five-check score: trend, RSI below ceiling, MACD histogram positive,
    /// close above fast SMA, close above lower band.
    pub fn scored(rsi_ceiling: f64, threshold: usize) -> Self {
        Self {
            predicates: vec![
                Predicate::Trend,
                Predicate::RsiBelow {
                    ceiling: rsi_ceiling,
                },
                Predicate::MacdPositive,
                Predicate::CloseAboveFast,
                Predicate::CloseAboveLowerBand,
            ],
            threshold,
        }
    }

    /// Threshold must be reachable and non-zero.
    pub fn is_satisfiable(&self) -> bool {
        self.threshold >= 1 && self.threshold <= self.predicates.len()
    }
}

impl Default for SignalRule {
    fn default() -> Self {
        Self::scored(Self::DEFAULT_RSI_CEILING, Self::DEFAULT_THRESHOLD)
    }
}

/// Classify one row.
///
/// BUY when the score reaches the threshold. Otherwise SELL when the fast SMA
/// is below the slow SMA. HOLD when either SMA is undefined, they are equal,
/// or the trend is up without enough confirmation.
pub fn classify_signal(row: &IndicatorRow, rule: &SignalRule) -> Signal {
    if rule.threshold > 0 && signal_score(row, &rule.predicates) >= rule.threshold {
        return Signal::Buy;
    }
    match (row.sma_fast, row.sma_slow) {
        (Some(f), Some(s)) if f < s => Signal::Sell,
        _ => Signal::Hold,
    }
}

/// Classify with the plain crossover rule.
pub fn crossover_signal(row: &IndicatorRow) -> Signal {
    classify_signal(row, &SignalRule::crossover())
}

/// Rising edges of a boolean sequence: true where the flag is set and the
/// previous one was not. The first element is never an edge.
pub fn edge_events<I>(flags: I) -> Vec<bool>
where
    I: IntoIterator<Item = bool>,
{
    flags
        .into_iter()
        .scan(None, |prev: &mut Option<bool>, flag| {
            let edge = matches!(*prev, Some(false)) && flag;
            *prev = Some(flag);
            Some(edge)
        })
        .collect()
}

/// A row with its score, signal, and buy-event flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub row: IndicatorRow,
    pub score: usize,
    pub signal: Signal,
    pub buy_event: bool,
}

impl SignalRow {
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.row.bar.timestamp
    }
}

/// Score, classify, and mark buy events for a whole frame.
pub fn annotate(rows: Vec<IndicatorRow>, rule: &SignalRule) -> Vec<SignalRow> {
    let classified: Vec<(IndicatorRow, usize, Signal)> = rows
        .into_iter()
        .map(|row| {
            let score = signal_score(&row, &rule.predicates);
            let signal = classify_signal(&row, rule);
            (row, score, signal)
        })
        .collect();

    let events = edge_events(classified.iter().map(|(_, _, s)| *s == Signal::Buy));

    classified
        .into_iter()
        .zip(events)
        .map(|((row, score, signal), buy_event)| SignalRow {
            row,
            score,
            signal,
            buy_event,
        })
        .collect()
}

/// Timestamp of the most recent buy event.
pub fn last_event_timestamp(rows: &[SignalRow]) -> Option<DateTime<Utc>> {
    rows.iter()
        .rev()
        .find(|r| r.buy_event)
        .map(SignalRow::timestamp)
}
