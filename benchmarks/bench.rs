use std::hint::black_box;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use guacamole::armnod::Armnod;
use guacamole::{Backend, Guacamole, Scrambler, ZipfParams};

const SEED: u64 = 0x9e3779b97f4a7c15;

fn backends() -> Vec<Backend> {
    let mut all = vec![Backend::Portable];
    all.extend(Backend::accelerated());

    all
}

fn fill_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    group.measurement_time(Duration::from_secs(5));

    for len in [64usize, 4096, 1 << 20] {
        let mut buf = vec![0u8; len];
        group.throughput(Throughput::Bytes(len as u64));

        for backend in backends() {
            let g = Guacamole::with_backend(SEED, backend);

            group.bench_with_input(BenchmarkId::new(format!("{backend:?}"), len), &len, |b, _| {
                b.iter(|| g.fill(black_box(&mut buf)))
            });
        }
    }

    group.finish();
}

fn draw_benchmark(c: &mut Criterion) {
    let g = Guacamole::new_seeded(SEED);

    let mut group = c.benchmark_group("draws");
    group.throughput(Throughput::Elements(1));
    group.bench_function("next_u32", |b| b.iter(|| black_box(g.next_u32())));
    group.bench_function("next_u64", |b| b.iter(|| black_box(g.next_u64())));
    group.bench_function("next_f64", |b| b.iter(|| black_box(g.next_f64())));
    group.bench_function("reseed", |b| {
        let mut seed = 0u64;
        b.iter(|| {
            seed += 1;
            g.seed(black_box(seed));
            black_box(g.next_u32())
        })
    });
    group.finish();
}

fn zipf_benchmark(c: &mut Criterion) {
    let g = Guacamole::new_seeded(SEED);

    let mut group = c.benchmark_group("zipf");
    group.throughput(Throughput::Elements(1));

    for theta in [0.0, 0.5, 0.99] {
        let params = ZipfParams::from_theta(1_000_000, theta).unwrap();

        group.bench_with_input(BenchmarkId::new("sample", theta), &params, |b, params| {
            b.iter(|| black_box(g.zipf(params)))
        });
    }

    group.bench_function("build_1e9", |b| {
        b.iter(|| ZipfParams::from_theta(black_box(1_000_000_000), 0.99).unwrap())
    });
    group.finish();
}

fn scrambler_benchmark(c: &mut Criterion) {
    let s = Scrambler::new(SEED);

    let mut group = c.benchmark_group("scrambler");
    group.throughput(Throughput::Elements(1));
    group.bench_function("scramble", |b| {
        let mut v = 0u64;
        b.iter(|| {
            v += 1;
            black_box(s.scramble(v))
        })
    });
    group.bench_function("rekey", |b| {
        let mut s = Scrambler::default();
        let mut key = 0u64;
        b.iter(|| {
            key += 1;
            s.rekey(black_box(key));
        })
    });
    group.finish();
}

fn armnod_benchmark(c: &mut Criterion) {
    let mut strings = Armnod::default();

    c.bench_function("armnod/default", |b| b.iter(|| black_box(strings.next_string())));
}

criterion_group!(
    benches,
    fill_benchmark,
    draw_benchmark,
    zipf_benchmark,
    scrambler_benchmark,
    armnod_benchmark
);
criterion_main!(benches);
