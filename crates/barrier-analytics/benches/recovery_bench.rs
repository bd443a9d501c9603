use barrier_analytics::{compute_recoveries, compute_recovery, compute_windows, KnockInPolicy};
use barrier_core::{HoldingPeriod, PriceSeries, ThresholdSet};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rust_decimal::Decimal;

// 장기 하락 후 느린 회복: 손실 윈도우가 많이 생기는 시계열
fn generate_series(n: usize) -> PriceSeries {
    let closes: Vec<Decimal> = (0..n)
        .map(|i| {
            let x = i as f64 / n as f64;
            let trend = 100.0 - 60.0 * (x * std::f64::consts::PI).sin();
            let noise = (i as f64 * 0.37).sin() * 3.0;
            Decimal::try_from(trend + noise).unwrap_or(Decimal::ONE_HUNDRED)
        })
        .collect();
    let start = NaiveDate::from_ymd_opt(2000, 1, 3).unwrap();
    PriceSeries::from_trading_days(start, &closes).unwrap()
}

fn bench_recovery_sweep_vs_linear(c: &mut Criterion) {
    let thresholds = ThresholdSet::default();
    let holding = HoldingPeriod::new(126).unwrap();

    for &size in &[1_000, 5_000] {
        let series = generate_series(size);
        let windows =
            compute_windows(&series, &thresholds, holding, KnockInPolicy::default()).unwrap();

        let mut group = c.benchmark_group(format!("recovery_{}", size));

        group.bench_function("sweep", |b| {
            b.iter(|| black_box(compute_recoveries(black_box(&series), black_box(&windows))))
        });

        group.bench_function("linear_per_window", |b| {
            b.iter(|| {
                windows
                    .iter()
                    .filter(|w| w.is_loss())
                    .map(|w| compute_recovery(black_box(&series), w))
                    .count()
            })
        });

        group.finish();
    }
}

fn bench_windows(c: &mut Criterion) {
    let series = generate_series(10_000);
    let thresholds = ThresholdSet::default();

    c.bench_function("compute_windows_10000", |b| {
        b.iter(|| {
            black_box(compute_windows(
                black_box(&series),
                &thresholds,
                HoldingPeriod::default(),
                KnockInPolicy::default(),
            )
            .unwrap())
        })
    });
}

criterion_group!(benches, bench_recovery_sweep_vs_linear, bench_windows);
criterion_main!(benches);
