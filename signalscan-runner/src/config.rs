//! Serializable scan configuration.
//!
//! Loaded from TOML. Every section and field has a default, so an empty file
//! is a valid configuration:
//!
//! ```toml
//! [universe]
//! symbols = ["BTC-USD", "AAPL"]
//! period = "1y"
//! interval = "1d"
//!
//! [indicators]
//! fast_window = 50
//! slow_window = 200
//!
//! [signal]
//! rule = "scored"
//! threshold = 3
//!
//! [risk]
//! capital = 1000.0
//! risk_fraction = 0.02
//!
//! [fetch]
//! source = "yahoo"
//! timeout_secs = 5
//! ```

use serde::{Deserialize, Serialize};
use signalscan_core::domain::{Interval, Period};
use signalscan_core::engine::{IndicatorParams, ParamsError};
use signalscan_core::risk::{RiskParams, RiskParamsError};
use signalscan_core::signal::SignalRule;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid indicator settings: {0}")]
    Indicators(#[from] ParamsError),

    #[error("invalid risk settings: {0}")]
    Risk(#[from] RiskParamsError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Assets to scan and the history to request for each.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    pub symbols: Vec<String>,
    pub period: Period,
    pub interval: Interval,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            symbols: ["BTC-USD", "ETH-USD", "XRP-USD", "AAPL", "TSLA"]
                .into_iter()
                .map(String::from)
                .collect(),
            period: Period::OneYear,
            interval: Interval::Daily,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    Crossover,
    #[default]
    Scored,
}

impl std::str::FromStr for RuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crossover" => Ok(Self::Crossover),
            "scored" => Ok(Self::Scored),
            other => Err(ConfigError::Invalid(format!("unknown signal rule '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rule: RuleKind,
    /// Score needed for BUY under the scored rule.
    pub threshold: usize,
    pub rsi_ceiling: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rule: RuleKind::Scored,
            threshold: SignalRule::DEFAULT_THRESHOLD,
            rsi_ceiling: SignalRule::DEFAULT_RSI_CEILING,
        }
    }
}

impl SignalConfig {
    pub fn to_rule(&self) -> SignalRule {
        match self.rule {
            RuleKind::Crossover => SignalRule::crossover(),
            RuleKind::Scored => SignalRule::scored(self.rsi_ceiling, self.threshold),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl std::str::FromStr for SourceKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yahoo" => Ok(Self::Yahoo),
            "csv" => Ok(Self::Csv),
            "synthetic" => Ok(Self::Synthetic),
            other => Err(ConfigError::Invalid(format!("unknown data source '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub source: SourceKind,
    /// Hard per-asset limit on a fetch, retries included.
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Directory of `<SYMBOL>.csv` files for the csv source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv_dir: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::Yahoo,
            timeout_secs: 5,
            max_retries: 2,
            csv_dir: None,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Top-level scan configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub universe: UniverseConfig,
    pub indicators: IndicatorParams,
    pub signal: SignalConfig,
    pub risk: RiskParams,
    pub fetch: FetchConfig,
}

impl ScanConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.risk.validate()?;

        if self.indicators.fast_window >= self.indicators.slow_window {
            return Err(ConfigError::Invalid(format!(
                "fast_window ({}) must be shorter than slow_window ({})",
                self.indicators.fast_window, self.indicators.slow_window
            )));
        }
        if !self.signal.to_rule().is_satisfiable() {
            return Err(ConfigError::Invalid(format!(
                "signal threshold {} is out of range for the {:?} rule",
                self.signal.threshold, self.signal.rule
            )));
        }
        if !self.signal.rsi_ceiling.is_finite() {
            return Err(ConfigError::Invalid("rsi_ceiling must be finite".into()));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be >= 1".into()));
        }
        if self.fetch.source == SourceKind::Csv && self.fetch.csv_dir.is_none() {
            return Err(ConfigError::Invalid(
                "the csv source needs fetch.csv_dir".into(),
            ));
        }
        Ok(())
    }

    /// Deterministic hash of the configuration.
    ///
    /// Two scans with identical settings share a fingerprint, so reports can
    /// be matched to the settings that produced them.
    pub fn fingerprint(&self) -> String {
        let canonical = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}
