//! Benchmarks for bit-information analysis and rounding.

use bitround_rs::{
    analyze, quantize, raw_information_curve, BitRoundConfig, BitRounder, KeepBits,
    DEFAULT_FILL_VALUE,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn generate_test_data(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let base = 280.0 + (i as f32) / 1000.0;
            base + (i as f32 * 0.001).sin() * 10.0 + (i as f32 * 0.37).cos() * 0.01
        })
        .collect()
}

fn bench_information_curve(c: &mut Criterion) {
    let mut group = c.benchmark_group("information_curve");

    for size in [1000, 10000, 100000] {
        let data = generate_test_data(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| raw_information_curve(black_box(data)))
        });
    }

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");

    for size in [1000, 10000, 100000] {
        let data = generate_test_data(size);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &data, |b, data| {
            b.iter(|| analyze(black_box(data), 0.99, 0.9999))
        });
    }

    group.finish();
}

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");

    for keep in [1u32, 7, 16] {
        let data = generate_test_data(100000);
        let keep = KeepBits::new(keep).unwrap();

        group.throughput(Throughput::Elements(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("keep_{}", keep)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut copy = data.clone();
                    quantize(black_box(&mut copy), keep, DEFAULT_FILL_VALUE);
                    copy
                })
            },
        );
    }

    group.finish();
}

fn bench_round_slices(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_slices");
    let rounder = BitRounder::new(BitRoundConfig::default()).unwrap();

    for slices in [4, 16, 64] {
        let slice_len = 180 * 360;
        let data = generate_test_data(slices * slice_len);

        group.throughput(Throughput::Elements(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(slices), &data, |b, data| {
            b.iter(|| {
                let mut copy = data.clone();
                rounder.round_slices(black_box(&mut copy), slice_len, DEFAULT_FILL_VALUE)
            })
        });
    }

    group.finish();
}

fn bench_compressibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("compressibility");

    for inflevel in [0.99, 0.999, 0.9999] {
        let rounder = BitRounder::new(BitRoundConfig::new(inflevel)).unwrap();
        let mut data = generate_test_data(10000);
        let nsb = analyze(&data, 0.99, inflevel).unwrap();
        quantize(&mut data, nsb, DEFAULT_FILL_VALUE);

        let zero_bits: u32 = data.iter().map(|v| v.to_bits().trailing_zeros().min(23)).sum();
        println!(
            "inflevel {}: keep {} bits, {:.1} trailing zero bits per value",
            inflevel,
            nsb,
            zero_bits as f64 / data.len() as f64
        );

        group.throughput(Throughput::Elements(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("inflevel_{}", inflevel)),
            &data,
            |b, data| {
                b.iter(|| {
                    let mut copy = data.clone();
                    rounder.round(black_box(&mut copy), DEFAULT_FILL_VALUE)
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_information_curve,
    bench_analyze,
    bench_quantize,
    bench_round_slices,
    bench_compressibility
);
criterion_main!(benches);
