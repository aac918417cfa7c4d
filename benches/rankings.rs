use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use co2_analysis::processing::{
    rank_by_co2_per_capita, rank_by_gdp_per_capita, rank_co2_change, rank_co2_per_capita_windows,
    AnalysisOptions,
};
use co2_analysis::types::UnifiedRecord;

fn synthetic(countries: usize, years: i32) -> Vec<UnifiedRecord> {
    let mut out = Vec::with_capacity(countries * years as usize);
    for c in 0..countries {
        for y in 0..years {
            let seed = (c * 7919 + y as usize * 104_729) % 10_007;
            out.push(UnifiedRecord {
                country: format!("COUNTRY {c}"),
                year: 1960 + y,
                population: Some(1_000.0 + seed as f64),
                gdp: (seed % 13 != 0).then(|| seed as f64 * 31.0),
                total_co2: Some(seed as f64 * 0.7),
                co2_per_capita: (seed % 17 != 0).then(|| seed as f64 / 1_000.0),
            });
        }
    }
    out
}

fn bench_rankings(c: &mut Criterion) {
    let options = AnalysisOptions::default();
    let mut group = c.benchmark_group("rankings");
    for countries in [50usize, 250] {
        let records = synthetic(countries, 55);
        group.bench_with_input(BenchmarkId::new("co2_per_capita", countries), &records, |b, r| {
            b.iter(|| rank_by_co2_per_capita(black_box(r), None, None, &options))
        });
        group.bench_with_input(BenchmarkId::new("gdp_per_capita", countries), &records, |b, r| {
            b.iter(|| rank_by_gdp_per_capita(black_box(r), None, None, &options))
        });
        group.bench_with_input(BenchmarkId::new("co2_change", countries), &records, |b, r| {
            b.iter(|| rank_co2_change(black_box(r), None, None, &options))
        });
    }
    group.finish();
}

fn bench_windows(c: &mut Criterion) {
    let options = AnalysisOptions::default();
    let records = synthetic(250, 55);
    let windows: Vec<_> = (1960..2010).step_by(5).map(|y| (Some(y), Some(y + 4))).collect();
    c.bench_function("co2_per_capita_windows_parallel", |b| {
        b.iter(|| rank_co2_per_capita_windows(black_box(&records), &windows, &options))
    });
}

criterion_group!(benches, bench_rankings, bench_windows);
criterion_main!(benches);
