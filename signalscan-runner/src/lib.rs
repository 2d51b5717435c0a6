//! SignalScan Runner — scan orchestration, configuration, report export.
//!
//! This crate builds on `signalscan-core` to provide:
//! - TOML scan configuration with defaults, validation, and a fingerprint
//! - Provider construction and a hard per-asset fetch timeout
//! - The multi-asset scanner with per-asset error recovery
//! - JSON, CSV, and text-table export

pub mod config;
pub mod export;
pub mod fetch;
pub mod scanner;

pub use config::{ConfigError, FetchConfig, RuleKind, ScanConfig, SignalConfig, SourceKind, UniverseConfig};
pub use export::{
    export_frame_csv, export_report_json, import_report_json, load_report, render_summary_table,
    render_warnings, save_report,
};
pub use fetch::{fetch_with_timeout, provider_from_config};
pub use scanner::{
    AssetFrame, AssetSummary, ScanReport, ScanWarning, Scanner, WarningKind, SCHEMA_VERSION,
};
