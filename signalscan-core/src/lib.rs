//! SignalScan Core — price bars, indicators, signals, risk plans, data providers.
//!
//! This crate is the pure computation layer of the scanner:
//! - Domain types (bars, normalized price series, period/interval)
//! - Trailing-window indicators (SMA, RSI, ATR, Bollinger, MACD histogram)
//! - Indicator pass producing one row per bar
//! - Scored and crossover signal rules with edge-triggered buy events
//! - ATR-based stop/target/size plan
//! - Data providers (Yahoo Finance, CSV files, synthetic) behind one trait

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod risk;
pub mod signal;

pub use domain::{Interval, Period, PriceBar, PriceSeries};
pub use engine::{compute_indicators, HistoryPolicy, IndicatorParams, IndicatorRow};
pub use risk::{risk_plan, RiskParams, RiskPlan};
pub use signal::{annotate, classify_signal, Signal, SignalRow, SignalRule};
