//! Multi-asset scan: fetch, normalize, compute, classify, size.
//!
//! Assets are processed one at a time. Each asset runs inside its own error
//! boundary: a failure becomes a [`ScanWarning`] and the batch continues.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signalscan_core::data::{DataProvider, DataSource};
use signalscan_core::domain::{Interval, Period, PriceSeries};
use signalscan_core::engine::{compute_indicators, HistoryPolicy};
use signalscan_core::risk::{risk_plan, RiskPlan};
use signalscan_core::signal::{annotate, last_event_timestamp, Signal, SignalRow, SignalRule};
use tracing::{info, warn};

use crate::config::{ConfigError, ScanConfig};
use crate::fetch::{fetch_with_timeout, provider_from_config};

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Category of a recovered per-asset failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Fetch failed, timed out, or returned nothing usable.
    DataUnavailable,
    /// Fewer bars than the longest indicator window.
    InsufficientHistory,
    /// No high/low column, so ATR and the risk plan are undefined.
    MissingColumn,
    /// A computation hit a degenerate value (zero stop distance).
    NumericDegenerate,
}

impl WarningKind {
    pub fn label(&self) -> &'static str {
        match self {
            WarningKind::DataUnavailable => "data unavailable",
            WarningKind::InsufficientHistory => "insufficient history",
            WarningKind::MissingColumn => "missing column",
            WarningKind::NumericDegenerate => "numeric degenerate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub asset: String,
    pub kind: WarningKind,
    pub message: String,
}

impl ScanWarning {
    fn new(asset: &str, kind: WarningKind, message: impl Into<String>) -> Self {
        Self {
            asset: asset.to_string(),
            kind,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.asset, self.message, self.kind.label())
    }
}

/// One line of the scan summary. `None` renders as `N/A`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub asset: String,
    pub price: f64,
    pub signal: Option<Signal>,
    pub score: Option<usize>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub position_size: Option<f64>,
    pub last_buy_event: Option<DateTime<Utc>>,
    pub bars: usize,
    pub warnings: Vec<WarningKind>,
}

impl AssetSummary {
    pub fn is_buy(&self) -> bool {
        self.signal == Some(Signal::Buy)
    }
}

/// The full annotated history for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetFrame {
    pub asset: String,
    pub source: DataSource,
    pub rows: Vec<SignalRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub config_fingerprint: String,
    pub period: Period,
    pub interval: Interval,
    pub summaries: Vec<AssetSummary>,
    pub frames: Vec<AssetFrame>,
    pub warnings: Vec<ScanWarning>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl ScanReport {
    pub fn summary(&self, asset: &str) -> Option<&AssetSummary> {
        self.summaries.iter().find(|s| s.asset == asset)
    }

    pub fn frame(&self, asset: &str) -> Option<&AssetFrame> {
        self.frames.iter().find(|f| f.asset == asset)
    }

    pub fn warnings_for<'a>(&'a self, asset: &'a str) -> impl Iterator<Item = &'a ScanWarning> {
        self.warnings.iter().filter(move |w| w.asset == asset)
    }
}

/// Everything one asset produced.
struct AssetOutcome {
    summary: AssetSummary,
    frame: AssetFrame,
    warnings: Vec<ScanWarning>,
}

pub struct Scanner {
    provider: Arc<dyn DataProvider>,
    config: ScanConfig,
    rule: SignalRule,
}

impl Scanner {
    /// Validate `config` and pair it with an explicit provider.
    pub fn new(provider: Arc<dyn DataProvider>, config: ScanConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rule = config.signal.to_rule();
        Ok(Self {
            provider,
            config,
            rule,
        })
    }

    /// Validate `config` and build the provider it names.
    pub fn from_config(config: ScanConfig) -> Result<Self, ConfigError> {
        let provider = provider_from_config(&config.fetch)?;
        Self::new(provider, config)
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan the configured universe.
    pub fn scan_universe(&self) -> ScanReport {
        let symbols = self.config.universe.symbols.clone();
        self.scan(&symbols)
    }

    /// Scan `symbols` in order. Never fails as a whole.
    pub fn scan(&self, symbols: &[String]) -> ScanReport {
        let mut report = ScanReport {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            config_fingerprint: self.config.fingerprint(),
            period: self.config.universe.period,
            interval: self.config.universe.interval,
            summaries: Vec::with_capacity(symbols.len()),
            frames: Vec::with_capacity(symbols.len()),
            warnings: Vec::new(),
        };

        for symbol in symbols {
            match self.scan_asset(symbol) {
                Ok(outcome) => {
                    for w in &outcome.warnings {
                        warn!(symbol = %symbol, kind = w.kind.label(), "{}", w.message);
                    }
                    info!(
                        symbol = %symbol,
                        signal = ?outcome.summary.signal,
                        bars = outcome.summary.bars,
                        "scanned"
                    );
                    report.summaries.push(outcome.summary);
                    report.frames.push(outcome.frame);
                    report.warnings.extend(outcome.warnings);
                }
                Err(warnings) => {
                    for w in &warnings {
                        warn!(symbol = %symbol, kind = w.kind.label(), "{}", w.message);
                    }
                    report.warnings.extend(warnings);
                }
            }
        }

        report
    }

    /// Run one asset through the pipeline.
    ///
    /// `Err` means the asset is left out of the summary; the warnings say why.
    fn scan_asset(&self, symbol: &str) -> Result<AssetOutcome, Vec<ScanWarning>> {
        let universe = &self.config.universe;
        let params = &self.config.indicators;
        let mut warnings = Vec::new();

        let fetched = fetch_with_timeout(
            Arc::clone(&self.provider),
            symbol,
            universe.period,
            universe.interval,
            self.config.fetch.timeout(),
        )
        .map_err(|e| vec![ScanWarning::new(symbol, WarningKind::DataUnavailable, e.to_string())])?;

        let source = fetched.source;
        let (series, normalized) = PriceSeries::from_raw(symbol, fetched.bars);

        if normalized.dropped_closes > 0 {
            warnings.push(ScanWarning::new(
                symbol,
                WarningKind::DataUnavailable,
                format!("dropped {} bars with a non-numeric close", normalized.dropped_closes),
            ));
        }
        if series.is_empty() {
            warnings.push(ScanWarning::new(
                symbol,
                WarningKind::DataUnavailable,
                "no usable bars",
            ));
            return Err(warnings);
        }

        let needed = params.min_history();
        if series.len() < needed {
            let message = format!("{} bars, indicators need {needed}", series.len());
            if params.history_policy == HistoryPolicy::Strict {
                warnings.push(ScanWarning::new(
                    symbol,
                    WarningKind::InsufficientHistory,
                    format!("{message}; skipped under strict policy"),
                ));
                return Err(warnings);
            }
            warnings.push(ScanWarning::new(symbol, WarningKind::InsufficientHistory, message));
        }

        if series.lacks_range() {
            warnings.push(ScanWarning::new(
                symbol,
                WarningKind::MissingColumn,
                "no high/low data; ATR and risk plan unavailable",
            ));
        } else if normalized.missing_range > 0 {
            warnings.push(ScanWarning::new(
                symbol,
                WarningKind::MissingColumn,
                format!("{} bars without high/low", normalized.missing_range),
            ));
        }

        let rows = annotate(compute_indicators(&series, params), &self.rule);
        let Some(last) = rows.last() else {
            warnings.push(ScanWarning::new(
                symbol,
                WarningKind::DataUnavailable,
                "indicator pass produced no rows",
            ));
            return Err(warnings);
        };

        let defined = !last.row.is_warmup();
        let plan: Option<RiskPlan> = risk_plan(&last.row, last.signal, &self.config.risk);
        if plan.as_ref().is_some_and(|p| p.position_size.is_none()) {
            warnings.push(ScanWarning::new(
                symbol,
                WarningKind::NumericDegenerate,
                "stop distance is zero; position size undefined",
            ));
        }

        let summary = AssetSummary {
            asset: symbol.to_string(),
            price: last.row.close(),
            signal: defined.then_some(last.signal),
            score: defined.then_some(last.score),
            stop_loss: plan.as_ref().map(|p| p.stop_loss),
            take_profit: plan.as_ref().map(|p| p.take_profit),
            position_size: plan.as_ref().and_then(|p| p.position_size),
            last_buy_event: last_event_timestamp(&rows),
            bars: rows.len(),
            warnings: warnings.iter().map(|w| w.kind).collect(),
        };

        Ok(AssetOutcome {
            summary,
            frame: AssetFrame {
                asset: symbol.to_string(),
                source,
                rows,
            },
            warnings,
        })
    }
}
