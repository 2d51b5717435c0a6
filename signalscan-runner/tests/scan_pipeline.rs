//! Scanner behaviour against a scripted provider: per-asset recovery,
//! summaries, warnings, and the fetch timeout.

use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use signalscan_core::data::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use signalscan_core::domain::{Interval, Period};
use signalscan_core::engine::HistoryPolicy;
use signalscan_core::signal::Signal;
use signalscan_runner::{RuleKind, ScanConfig, Scanner, WarningKind};

enum Script {
    Bars(Vec<RawBar>),
    NotFound,
    Sleep(Duration),
}

struct ScriptedProvider {
    scripts: HashMap<String, Script>,
}

impl ScriptedProvider {
    fn new(entries: Vec<(&str, Script)>) -> Arc<Self> {
        Arc::new(Self {
            scripts: entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        })
    }
}

impl DataProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch(
        &self,
        symbol: &str,
        _period: Period,
        _interval: Interval,
    ) -> Result<FetchResult, DataError> {
        let bars = match self.scripts.get(symbol) {
            Some(Script::Bars(bars)) => bars.clone(),
            Some(Script::Sleep(d)) => {
                thread::sleep(*d);
                Vec::new()
            }
            Some(Script::NotFound) | None => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
        };
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}

fn raw_bars(closes: &[Option<f64>], with_range: bool) -> Vec<RawBar> {
    let base = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| RawBar {
            timestamp: base + ChronoDuration::days(i as i64),
            open: close,
            high: if with_range { close.map(|c| c + 1.0) } else { None },
            low: if with_range { close.map(|c| c - 1.0) } else { None },
            close,
            volume: Some(1000),
        })
        .collect()
}

fn ramp(n: usize) -> Vec<Option<f64>> {
    (0..n).map(|i| Some(100.0 + i as f64)).collect()
}

fn ramp_config() -> ScanConfig {
    let mut config = ScanConfig::default();
    config.indicators.fast_window = 20;
    config.indicators.slow_window = 50;
    config
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn ramp_asset_is_a_buy_with_risk_plan() {
    let provider = ScriptedProvider::new(vec![("AAPL", Script::Bars(raw_bars(&ramp(60), true)))]);
    let scanner = Scanner::new(provider, ramp_config()).unwrap();
    let report = scanner.scan(&symbols(&["AAPL"]));

    let s = report.summary("AAPL").unwrap();
    assert_eq!(s.price, 159.0);
    assert_eq!(s.signal, Some(Signal::Buy));
    assert!(s.score.unwrap() >= 3);
    assert!((s.stop_loss.unwrap() - 157.0).abs() < 1e-9);
    assert!((s.take_profit.unwrap() - 163.0).abs() < 1e-9);
    assert!((s.position_size.unwrap() - 10.0).abs() < 1e-9);
    assert!(s.last_buy_event.is_some());
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
}

#[test]
fn crossover_rule_reports_first_buy_bar() {
    let provider = ScriptedProvider::new(vec![("AAPL", Script::Bars(raw_bars(&ramp(60), true)))]);
    let mut config = ramp_config();
    config.signal.rule = RuleKind::Crossover;
    let report = Scanner::new(provider, config).unwrap().scan(&symbols(&["AAPL"]));

    let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap() + ChronoDuration::days(49);
    assert_eq!(report.summary("AAPL").unwrap().last_buy_event, Some(expected));
}

#[test]
fn one_failing_asset_does_not_abort_the_batch() {
    let provider = ScriptedProvider::new(vec![
        ("GOOD", Script::Bars(raw_bars(&ramp(60), true))),
        ("GONE", Script::NotFound),
        ("EMPTY", Script::Bars(Vec::new())),
    ]);
    let report = Scanner::new(provider, ramp_config())
        .unwrap()
        .scan(&symbols(&["GONE", "GOOD", "EMPTY"]));

    assert_eq!(report.summaries.len(), 1);
    assert_eq!(report.summaries[0].asset, "GOOD");
    let gone: Vec<_> = report.warnings_for("GONE").collect();
    assert_eq!(gone.len(), 1);
    assert_eq!(gone[0].kind, WarningKind::DataUnavailable);
    assert!(gone[0].message.contains("symbol not found"));
    assert!(report
        .warnings_for("EMPTY")
        .any(|w| w.kind == WarningKind::DataUnavailable));
}

#[test]
fn short_history_keeps_a_row_with_undefined_fields() {
    let provider = ScriptedProvider::new(vec![("NEW", Script::Bars(raw_bars(&ramp(10), true)))]);
    let mut config = ScanConfig::default();
    config.indicators.fast_window = 20;
    config.indicators.slow_window = 50;
    config.indicators.rsi_window = 20;
    config.indicators.atr_window = 20;
    let report = Scanner::new(provider, config).unwrap().scan(&symbols(&["NEW"]));

    let s = report.summary("NEW").unwrap();
    assert_eq!(s.price, 109.0);
    assert_eq!(s.signal, None);
    assert_eq!(s.score, None);
    assert_eq!(s.stop_loss, None);
    assert_eq!(s.position_size, None);
    assert_eq!(s.last_buy_event, None);
    assert_eq!(s.warnings, vec![WarningKind::InsufficientHistory]);
    assert_eq!(report.frame("NEW").unwrap().rows.len(), 10);
}

#[test]
fn short_history_under_strict_policy_is_omitted() {
    let provider = ScriptedProvider::new(vec![("NEW", Script::Bars(raw_bars(&ramp(10), true)))]);
    let mut config = ramp_config();
    config.indicators.history_policy = HistoryPolicy::Strict;
    let report = Scanner::new(provider, config).unwrap().scan(&symbols(&["NEW"]));

    assert!(report.summaries.is_empty());
    assert!(report.frames.is_empty());
    assert_eq!(report.warnings[0].kind, WarningKind::InsufficientHistory);
}

#[test]
fn non_numeric_closes_are_dropped_and_reported() {
    let mut closes = ramp(60);
    closes[10] = None;
    closes[20] = Some(f64::NAN);
    let provider = ScriptedProvider::new(vec![("GAPS", Script::Bars(raw_bars(&closes, true)))]);
    let report = Scanner::new(provider, ramp_config()).unwrap().scan(&symbols(&["GAPS"]));

    let s = report.summary("GAPS").unwrap();
    assert_eq!(s.bars, 58);
    let w: Vec<_> = report.warnings_for("GAPS").collect();
    assert!(w[0].message.contains("dropped 2 bars"));
}

#[test]
fn missing_high_low_gives_no_plan_and_a_warning() {
    let provider = ScriptedProvider::new(vec![("^IDX", Script::Bars(raw_bars(&ramp(60), false)))]);
    let report = Scanner::new(provider, ramp_config()).unwrap().scan(&symbols(&["^IDX"]));

    let s = report.summary("^IDX").unwrap();
    assert_eq!(s.signal, Some(Signal::Buy));
    assert_eq!(s.stop_loss, None);
    assert_eq!(s.position_size, None);
    assert!(s.warnings.contains(&WarningKind::MissingColumn));
}

#[test]
fn slow_asset_times_out_and_the_next_one_still_runs() {
    let provider = ScriptedProvider::new(vec![
        ("SLOW", Script::Sleep(Duration::from_secs(5))),
        ("FAST", Script::Bars(raw_bars(&ramp(60), true))),
    ]);
    let mut config = ramp_config();
    config.fetch.timeout_secs = 1;

    let start = Instant::now();
    let report = Scanner::new(provider, config).unwrap().scan(&symbols(&["SLOW", "FAST"]));
    assert!(start.elapsed() < Duration::from_secs(4));

    assert!(report.summary("FAST").is_some());
    let slow: Vec<_> = report.warnings_for("SLOW").collect();
    assert_eq!(slow[0].kind, WarningKind::DataUnavailable);
    assert!(slow[0].message.contains("timed out"));
}

#[test]
fn synthetic_scan_is_reproducible() {
    let mut config = ScanConfig::default();
    config.fetch.source = signalscan_runner::SourceKind::Synthetic;
    let a = Scanner::from_config(config.clone()).unwrap().scan_universe();
    let b = Scanner::from_config(config).unwrap().scan_universe();
    assert_eq!(a.summaries, b.summaries);
    assert_eq!(a.config_fingerprint, b.config_fingerprint);
}

#[test]
fn zero_atr_keeps_the_stop_but_drops_the_size() {
    // Ramp up, then sit flat at the last close with no range: ATR decays to 0.
    let mut bars = raw_bars(&ramp(60), true);
    let last = bars[59].clone();
    for i in 1..=14 {
        bars.push(RawBar {
            timestamp: last.timestamp + ChronoDuration::days(i),
            open: Some(159.0),
            high: Some(159.0),
            low: Some(159.0),
            close: Some(159.0),
            volume: Some(1000),
        });
    }
    let provider = ScriptedProvider::new(vec![("FLAT", Script::Bars(bars))]);
    let mut config = ramp_config();
    config.signal.rule = RuleKind::Crossover;
    let report = Scanner::new(provider, config).unwrap().scan(&symbols(&["FLAT"]));

    let s = report.summary("FLAT").unwrap();
    assert_eq!(s.signal, Some(Signal::Buy));
    assert_eq!(s.stop_loss, Some(159.0));
    assert_eq!(s.take_profit, Some(159.0));
    assert_eq!(s.position_size, None);
    assert!(s.warnings.contains(&WarningKind::NumericDegenerate));
    assert!(report
        .warnings_for("FLAT")
        .any(|w| w.kind == WarningKind::NumericDegenerate));
}

#[test]
fn rsi_needs_one_more_bar_than_its_window() {
    let mut config = ScanConfig::default();
    config.indicators.fast_window = 5;
    config.indicators.slow_window = 10;
    config.indicators.rsi_window = 14;
    config.indicators.atr_window = 14;
    config.indicators.bb_window = 14;

    let provider = ScriptedProvider::new(vec![
        ("SHORT", Script::Bars(raw_bars(&ramp(14), true))),
        ("ENOUGH", Script::Bars(raw_bars(&ramp(15), true))),
    ]);
    let report = Scanner::new(provider, config.clone())
        .unwrap()
        .scan(&symbols(&["SHORT", "ENOUGH"]));
    let short = report.summary("SHORT").unwrap();
    assert!(short.warnings.contains(&WarningKind::InsufficientHistory));
    assert!(report.summary("ENOUGH").unwrap().warnings.is_empty());

    config.indicators.history_policy = HistoryPolicy::Strict;
    let provider = ScriptedProvider::new(vec![("SHORT", Script::Bars(raw_bars(&ramp(14), true)))]);
    let report = Scanner::new(provider, config).unwrap().scan(&symbols(&["SHORT"]));
    assert!(report.summary("SHORT").is_none());
    assert_eq!(report.warnings[0].kind, WarningKind::InsufficientHistory);
}
