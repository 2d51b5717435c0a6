//! Criterion benchmarks for the scan hot paths.
//!
//! Benchmarks:
//! 1. Single indicators (SMA, RSI, ATR, Bollinger, MACD histogram)
//! 2. Full indicator pass (one row per bar)
//! 3. Signal annotation over a computed frame

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{Duration, TimeZone, Utc};
use signalscan_core::domain::{PriceBar, PriceSeries};
use signalscan_core::engine::{compute_indicators, IndicatorParams};
use signalscan_core::indicators::{Atr, Bollinger, Indicator, MacdHistogram, Rsi, Sma};
use signalscan_core::signal::{annotate, SignalRule};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<PriceBar> {
    let base = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            PriceBar::new(
                base + Duration::days(i as i64),
                close - 0.3,
                close + 1.5,
                close - 1.5,
                close,
                1_000_000 + (i as u64 % 500_000),
            )
        })
        .collect()
}

// ── 1. Single indicators ─────────────────────────────────────────────

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");

    for &bar_count in &[252, 1260, 8760] {
        let bars = make_bars(bar_count);
        let indicators: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(200)),
            Box::new(Rsi::new(14)),
            Box::new(Atr::new(14)),
            Box::new(Bollinger::upper(20, 2.0)),
            Box::new(MacdHistogram::standard()),
        ];

        for ind in &indicators {
            group.bench_with_input(
                BenchmarkId::new(ind.name().to_string(), bar_count),
                &bar_count,
                |b, _| b.iter(|| ind.compute(black_box(&bars))),
            );
        }
    }

    group.finish();
}

// ── 2. Full pass ─────────────────────────────────────────────────────

fn bench_compute_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_indicators");
    let params = IndicatorParams::default();

    for &bar_count in &[252, 1260, 8760] {
        let series = PriceSeries::new("BENCH", make_bars(bar_count));
        group.bench_with_input(BenchmarkId::from_parameter(bar_count), &bar_count, |b, _| {
            b.iter(|| compute_indicators(black_box(&series), black_box(&params)))
        });
    }

    group.finish();
}

// ── 3. Signal annotation ─────────────────────────────────────────────

fn bench_annotate(c: &mut Criterion) {
    let series = PriceSeries::new("BENCH", make_bars(2520));
    let rows = compute_indicators(&series, &IndicatorParams::default());
    let rule = SignalRule::default();

    c.bench_function("annotate_2520", |b| {
        b.iter(|| annotate(black_box(rows.clone()), black_box(&rule)))
    });
}

criterion_group!(benches, bench_indicators, bench_compute_indicators, bench_annotate);
criterion_main!(benches);
