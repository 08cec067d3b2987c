use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use metrics_windowed::Registry;

fn registry() -> Registry {
    Registry::builder().without_rotator().build().expect("failed to build registry")
}

fn registry_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry");

    group.bench_function("counter add (handle)", |b| {
        let registry = registry();
        let counter = registry.counter("requests");
        b.iter(|| counter.add(black_box(1)))
    });
    group.bench_function("counter add (by name)", |b| {
        let registry = registry();
        b.iter(|| registry.add_counter(black_box("requests"), 1))
    });
    group.bench_function("gauge set", |b| {
        let registry = registry();
        let gauge = registry.gauge("pool.size");
        b.iter(|| gauge.set(black_box(16.0)))
    });
    group.bench_function("histogram record", |b| {
        let registry = registry();
        let histogram =
            registry.histogram("latency", 1, 1_000_000, 3).expect("failed to create histogram");
        let mut value = 0u64;
        b.iter(|| {
            value = value % 1_000_000 + 1;
            histogram.record(black_box(value))
        })
    });
    group.bench_function("gauge snapshot", |b| {
        b.iter_batched_ref(
            || {
                let registry = registry();
                for i in 0..10 {
                    let histogram = registry
                        .histogram(format!("latency{}", i), 1, 1_000_000, 3)
                        .expect("failed to create histogram");
                    for v in 1..=1000 {
                        histogram.record(v * 7).expect("value in range");
                    }
                }
                registry
            },
            |registry| registry.gauges(),
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, registry_benchmark);
criterion_main!(benches);
