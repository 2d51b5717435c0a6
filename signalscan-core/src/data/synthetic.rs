//! Deterministic random-walk provider for offline runs and tests.
//!
//! The RNG is seeded from a BLAKE3 hash of the symbol, so the same symbol,
//! period, interval and anchor always produce the same bars.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, RawBar};
use crate::domain::{Interval, Period};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    /// Timestamp of the last generated bar.
    anchor: DateTime<Utc>,
    /// Emit bars without open/high/low (index-style data).
    close_only: bool,
    start_price: f64,
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self {
            anchor: Utc
                .with_ymd_and_hms(2024, 12, 31, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
            close_only: false,
            start_price: 100.0,
        }
    }
}

impl SyntheticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_anchor(mut self, anchor: DateTime<Utc>) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn close_only(mut self, close_only: bool) -> Self {
        self.close_only = close_only;
        self
    }

    pub fn with_start_price(mut self, price: f64) -> Self {
        self.start_price = price;
        self
    }

    fn seed_for(symbol: &str, interval: Interval) -> [u8; 32] {
        let mut hasher = blake3::Hasher::new();
        hasher.update(symbol.as_bytes());
        hasher.update(interval.as_str().as_bytes());
        *hasher.finalize().as_bytes()
    }

    /// Generate the bars for one symbol.
    ///
    /// Bars cover the calendar window `(anchor - period, anchor]`. Daily bars
    /// skip weekends; intraday bars run around the clock.
    pub fn generate(&self, symbol: &str, period: Period, interval: Interval) -> Vec<RawBar> {
        let mut rng = StdRng::from_seed(Self::seed_for(symbol, interval));
        let start = self.anchor - Duration::days(period.days());
        let step = interval.duration();

        let mut timestamps = Vec::new();
        let mut t = self.anchor;
        while t > start {
            let weekend = matches!(t.weekday(), Weekday::Sat | Weekday::Sun);
            if interval.is_intraday() || !weekend {
                timestamps.push(t);
            }
            t -= step;
        }
        timestamps.reverse();

        // Intraday moves are scaled down so a day of bars has a similar range.
        let scale = 1.0 / (interval.bars_per_day() as f64).sqrt();
        let mut price = self.start_price;

        timestamps
            .into_iter()
            .map(|timestamp| {
                let ret: f64 = rng.gen_range(-0.03..0.03) * scale;
                let open = price;
                let close = (price * (1.0 + ret)).max(0.01);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01) * scale);
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01) * scale);
                let volume = rng.gen_range(500_000..5_000_000u64);
                price = close;

                if self.close_only {
                    RawBar {
                        timestamp,
                        open: None,
                        high: None,
                        low: None,
                        close: Some(close),
                        volume: None,
                    }
                } else {
                    RawBar {
                        timestamp,
                        open: Some(open),
                        high: Some(high),
                        low: Some(low),
                        close: Some(close),
                        volume: Some(volume),
                    }
                }
            })
            .collect()
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        period: Period,
        interval: Interval,
    ) -> Result<FetchResult, DataError> {
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: self.generate(symbol, period, interval),
            source: DataSource::Synthetic,
        })
    }
}
