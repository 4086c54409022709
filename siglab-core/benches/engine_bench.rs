//! Criterion benchmarks for SignalLab hot paths.
//!
//! Benchmarks:
//! 1. Candle loop (full backtest, varying candle counts)
//! 2. Signal density (fixed candles, varying signal counts)
//! 3. Metrics computation over a long equity curve

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use siglab_core::metrics::PerformanceMetrics;
use siglab_core::{BacktestConfig, BacktestEngine, Candle, Direction, PredictionSignal};

// ── Helpers ──────────────────────────────────────────────────────────

fn make_candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0;
            let open = close - 0.3;
            Candle::new(i as i64 * 60_000, open, close + 1.5, close - 1.5, close, 1_000.0)
        })
        .collect()
}

/// One signal every `every` candles, alternating direction, confidence 70..100.
fn make_signals(candles: &[Candle], every: usize) -> Vec<PredictionSignal> {
    candles
        .iter()
        .enumerate()
        .step_by(every.max(1))
        .map(|(i, c)| {
            let direction = if i % 2 == 0 { Direction::Long } else { Direction::Short };
            PredictionSignal::new(c.timestamp, direction, 70.0 + (i % 30) as f64, c.close)
        })
        .collect()
}

fn bench_config() -> BacktestConfig {
    BacktestConfig {
        stop_loss_percent: Some(2.0),
        take_profit_percent: Some(4.0),
        max_concurrent_positions: 5,
        max_holding_candles: Some(50),
        ..Default::default()
    }
}

// ── 1. Candle loop ───────────────────────────────────────────────────

fn bench_candle_loop(c: &mut Criterion) {
    let engine = BacktestEngine::new(bench_config()).unwrap();
    let mut group = c.benchmark_group("candle_loop");
    for &n in &[1_000usize, 10_000, 100_000] {
        let candles = make_candles(n);
        let signals = make_signals(&candles, 10);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| engine.run_backtest(black_box(&candles), black_box(&signals)).unwrap())
        });
    }
    group.finish();
}

// ── 2. Signal density ────────────────────────────────────────────────

fn bench_signal_density(c: &mut Criterion) {
    let engine = BacktestEngine::new(bench_config()).unwrap();
    let candles = make_candles(10_000);
    let mut group = c.benchmark_group("signal_density");
    for &every in &[100usize, 10, 1] {
        let signals = make_signals(&candles, every);
        group.bench_with_input(BenchmarkId::new("every", every), &every, |b, _| {
            b.iter(|| engine.run_backtest(black_box(&candles), black_box(&signals)).unwrap())
        });
    }
    group.finish();
}

// ── 3. Metrics ───────────────────────────────────────────────────────

fn bench_metrics(c: &mut Criterion) {
    let engine = BacktestEngine::new(bench_config()).unwrap();
    let candles = make_candles(100_000);
    let signals = make_signals(&candles, 5);
    let result = engine.run_backtest(&candles, &signals).unwrap();

    c.bench_function("metrics_compute_100k", |b| {
        b.iter(|| {
            PerformanceMetrics::compute(
                black_box(&result.equity_curve),
                black_box(&result.trades),
                result.initial_capital,
                252.0,
            )
        })
    });
}

criterion_group!(benches, bench_candle_loop, bench_signal_density, bench_metrics);
criterion_main!(benches);
