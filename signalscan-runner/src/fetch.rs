//! Provider construction and the hard per-asset fetch timeout.
//!
//! The fetch runs on a named worker thread and hands its result back over an
//! `mpsc` channel. If the channel stays silent past the timeout the worker is
//! abandoned and the caller moves on; a late result is dropped with the
//! receiver.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use signalscan_core::data::{
    CircuitBreaker, CsvProvider, DataError, DataProvider, FetchResult, SyntheticProvider,
    YahooOptions, YahooProvider,
};
use signalscan_core::domain::{Interval, Period};
use tracing::{debug, warn};

use crate::config::{ConfigError, FetchConfig, SourceKind};

/// Build the provider named by the fetch settings.
pub fn provider_from_config(fetch: &FetchConfig) -> Result<Arc<dyn DataProvider>, ConfigError> {
    let provider: Arc<dyn DataProvider> = match fetch.source {
        SourceKind::Yahoo => {
            let options = YahooOptions {
                timeout: fetch.timeout(),
                max_retries: fetch.max_retries,
                ..YahooOptions::default()
            };
            let breaker = Arc::new(CircuitBreaker::default_provider());
            let yahoo = YahooProvider::new(breaker, options)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
            Arc::new(yahoo)
        }
        SourceKind::Csv => {
            let dir = fetch
                .csv_dir
                .clone()
                .ok_or_else(|| ConfigError::Invalid("the csv source needs fetch.csv_dir".into()))?;
            Arc::new(CsvProvider::new(dir))
        }
        SourceKind::Synthetic => Arc::new(SyntheticProvider::new()),
    };
    Ok(provider)
}

/// Fetch `symbol`, giving up after `timeout`.
///
/// Returns `DataError::Timeout` when the provider has not answered in time.
/// The worker thread is detached, not killed.
pub fn fetch_with_timeout(
    provider: Arc<dyn DataProvider>,
    symbol: &str,
    period: Period,
    interval: Interval,
    timeout: Duration,
) -> Result<FetchResult, DataError> {
    let (tx, rx) = mpsc::channel();
    let owned_symbol = symbol.to_string();

    thread::Builder::new()
        .name(format!("fetch-{symbol}"))
        .spawn(move || {
            let result = provider.fetch(&owned_symbol, period, interval);
            // Receiver is gone if the caller already timed out.
            let _ = tx.send(result);
        })
        .map_err(DataError::Io)?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => {
            warn!(symbol, timeout_ms = timeout.as_millis() as u64, "fetch timed out");
            Err(DataError::Timeout {
                symbol: symbol.to_string(),
                millis: timeout.as_millis(),
            })
        }
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            debug!(symbol, "fetch worker exited without a result");
            Err(DataError::Other(format!("fetch worker for {symbol} exited without a result")))
        }
    }
}
