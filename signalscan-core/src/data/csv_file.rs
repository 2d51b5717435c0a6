//! CSV file provider.
//!
//! Reads `<dir>/<SYMBOL>.csv`. The header must name a timestamp column
//! (`timestamp`, `date`, or `datetime`) and a `close` column; `open`, `high`,
//! `low` and `volume` are optional. Cells that do not parse become `None`.
//! The requested period is applied relative to the last timestamp in the
//! file; the interval is taken as-is (no resampling).

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use crate::domain::{Interval, Period};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

#[derive(Debug, Default)]
struct Columns {
    timestamp: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, DataError> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        let timestamp = find(&["timestamp", "date", "datetime"])
            .ok_or_else(|| DataError::Csv("no timestamp/date column".into()))?;
        let close = find(&["close"]).ok_or_else(|| DataError::Csv("no close column".into()))?;

        Ok(Self {
            timestamp,
            open: find(&["open"]),
            high: find(&["high"]),
            low: find(&["low"]),
            close,
            volume: find(&["volume"]),
        })
    }
}

/// Parse RFC 3339, `YYYY-MM-DD HH:MM:SS`, or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

fn cell_f64(record: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    idx.and_then(|i| record.get(i))
        .and_then(|v| v.trim().parse::<f64>().ok())
}

fn cell_u64(record: &csv::StringRecord, idx: Option<usize>) -> Option<u64> {
    let raw = idx.and_then(|i| record.get(i))?.trim();
    raw.parse::<u64>()
        .ok()
        .or_else(|| raw.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64))
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Read every row of a CSV file.
    pub fn read_file(path: &Path) -> Result<Vec<RawBar>, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;

        let headers = reader
            .headers()
            .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?
            .clone();
        let cols = Columns::from_headers(&headers)?;

        let mut bars = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| DataError::Csv(e.to_string()))?;
            let Some(timestamp) = record.get(cols.timestamp).and_then(parse_timestamp) else {
                warn!(file = %path.display(), row = line + 1, "skipping row with unparseable timestamp");
                continue;
            };
            bars.push(RawBar {
                timestamp,
                open: cell_f64(&record, cols.open),
                high: cell_f64(&record, cols.high),
                low: cell_f64(&record, cols.low),
                close: cell_f64(&record, Some(cols.close)),
                volume: cell_u64(&record, cols.volume),
            });
        }

        Ok(bars)
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_file"
    }

    fn fetch(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut bars = Self::read_file(&path)?;
        if let Some(last) = bars.iter().map(|b| b.timestamp).max() {
            let cutoff = last - Duration::days(period.days());
            bars.retain(|b| b.timestamp > cutoff);
        }
        debug!(symbol, bars = bars.len(), %interval, "loaded csv bars");

        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                period,
                interval,
            });
        }

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::CsvFile,
        })
    }
}
