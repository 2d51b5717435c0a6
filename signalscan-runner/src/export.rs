//! Reporting and export — JSON, CSV, and plain-text artifacts.
//!
//! - **JSON**: the whole [`ScanReport`], with schema versioning
//! - **CSV**: one annotated indicator frame per asset
//! - **Text**: fixed-width summary table
//!
//! Undefined values are empty cells in CSV and `N/A` in the table; no buy
//! event renders as `—`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::scanner::{AssetFrame, AssetSummary, ScanReport, SCHEMA_VERSION};

const NOT_AVAILABLE: &str = "N/A";
const NO_EVENT: &str = "—";

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_report_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

/// Deserialize a report, rejecting schema versions newer than this build.
pub fn import_report_json(json: &str) -> Result<ScanReport> {
    let report: ScanReport =
        serde_json::from_str(json).context("failed to deserialize ScanReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.6}")).unwrap_or_default()
}

/// Export one asset's frame as CSV.
///
/// Columns: timestamp, open, high, low, close, volume, sma_fast, sma_slow,
/// rsi, atr, bb_upper, bb_mid, bb_lower, macd_hist, score, signal, buy_event
pub fn export_frame_csv(frame: &AssetFrame) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "timestamp",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "sma_fast",
        "sma_slow",
        "rsi",
        "atr",
        "bb_upper",
        "bb_mid",
        "bb_lower",
        "macd_hist",
        "score",
        "signal",
        "buy_event",
    ])?;

    for r in &frame.rows {
        let bar = &r.row.bar;
        wtr.write_record([
            bar.timestamp.to_rfc3339(),
            cell(bar.open),
            cell(bar.high),
            cell(bar.low),
            cell(Some(bar.close)),
            bar.volume.map(|v| v.to_string()).unwrap_or_default(),
            cell(r.row.sma_fast),
            cell(r.row.sma_slow),
            cell(r.row.rsi),
            cell(r.row.atr),
            cell(r.row.bb_upper),
            cell(r.row.bb_mid),
            cell(r.row.bb_lower),
            cell(r.row.macd_hist),
            r.score.to_string(),
            r.signal.to_string(),
            r.buy_event.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Text summary ───────────────────────────────────────────────────

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    v.map(|x| format!("{x:.decimals$}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Fixed-width summary table, one line per asset.
pub fn render_summary_table(summaries: &[AssetSummary]) -> String {
    let mut out = String::with_capacity(128 * (summaries.len() + 2));
    let _ = writeln!(
        out,
        "{:<10} {:>12} {:>6} {:>5} {:>12} {:>12} {:>10} {:>4} {:<10}",
        "ASSET", "PRICE", "SIGNAL", "SCORE", "STOP", "TARGET", "SIZE", "BUY?", "LAST BUY"
    );
    let _ = writeln!(out, "{}", "-".repeat(91));

    for s in summaries {
        let signal = s
            .signal
            .map(|sig| sig.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let score = s
            .score
            .map(|v| v.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let last_buy = s
            .last_buy_event
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| NO_EVENT.to_string());
        let _ = writeln!(
            out,
            "{:<10} {:>12.4} {:>6} {:>5} {:>12} {:>12} {:>10} {:>4} {:<10}",
            s.asset,
            s.price,
            signal,
            score,
            fmt_opt(s.stop_loss, 4),
            fmt_opt(s.take_profit, 4),
            fmt_opt(s.position_size, 4),
            if s.is_buy() { "yes" } else { "no" },
            last_buy,
        );
    }

    out
}

/// Render the report warnings, one per line.
pub fn render_warnings(report: &ScanReport) -> String {
    report
        .warnings
        .iter()
        .map(|w| format!("warning: {w}\n"))
        .collect()
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a scan under `output_dir`:
/// - `report.json` — the whole `ScanReport`
/// - `summary.txt` — summary table followed by warnings
/// - `<ASSET>.csv` — annotated frame per asset
pub fn save_report(report: &ScanReport, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    let json = export_report_json(report)?;
    std::fs::write(output_dir.join("report.json"), json)?;

    let mut summary = render_summary_table(&report.summaries);
    summary.push_str(&render_warnings(report));
    std::fs::write(output_dir.join("summary.txt"), summary)?;

    for frame in &report.frames {
        let path = output_dir.join(format!("{}.csv", file_stem(&frame.asset)));
        let csv = export_frame_csv(frame)?;
        std::fs::write(&path, csv).with_context(|| format!("failed to write {}", path.display()))?;
    }

    Ok(())
}

/// Load a report from a directory written by [`save_report`].
pub fn load_report(dir: &Path) -> Result<ScanReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_report_json(&json)
}

/// Symbols like `^GSPC` or `EUR/USD` are not safe file names as-is.
fn file_stem(asset: &str) -> String {
    asset
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '.' { c } else { '_' })
        .collect()
}
