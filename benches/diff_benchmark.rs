//! Benchmarks for the diff engine.
//!
//! Run with: cargo bench --bench diff_benchmark

use apidiff::{ApiSnapshot, DiffEngine, EngineConfig, EntityRecord, ItemScope};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

/// Generate a snapshot with `modules` modules, each holding a few classes
/// with methods and attributes. Every `drop_every`-th class is skipped.
fn generate_snapshot(name: &str, modules: usize, drop_every: usize) -> ApiSnapshot {
    let mut snapshot = ApiSnapshot::new(name);
    for m in 0..modules {
        let module = format!("pkg.mod{m}");
        let _ = snapshot.add_entity(EntityRecord::module(module.as_str()));
        for c in 0..4 {
            if drop_every > 0 && (m * 4 + c) % drop_every == 0 {
                continue;
            }
            let class = format!("{module}.Class{c}");
            let _ = snapshot.add_entity(EntityRecord::class(class.as_str()));
            for f in 0..5 {
                let _ = snapshot.add_entity(
                    EntityRecord::function(format!("{class}.method{f}"))
                        .with_scope(ItemScope::Instance)
                        .with_private(f == 0),
                );
            }
            let _ = snapshot.add_entity(
                EntityRecord::attribute(format!("{class}.value")).with_scope(ItemScope::Instance),
            );
        }
    }
    snapshot
}

fn benchmark_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for modules in [100, 1000] {
        let old = generate_snapshot("old", modules, 7);
        let new = generate_snapshot("new", modules, 5);

        let sequential = DiffEngine::new();
        group.bench_with_input(BenchmarkId::new("sequential", modules), &modules, |b, _| {
            b.iter(|| black_box(sequential.diff(black_box(&old), black_box(&new))));
        });

        let parallel =
            DiffEngine::new().with_config(EngineConfig::builder().parallel(true).build());
        group.bench_with_input(BenchmarkId::new("parallel", modules), &modules, |b, _| {
            b.iter(|| black_box(parallel.diff(black_box(&old), black_box(&new))));
        });
    }

    group.finish();
}

fn benchmark_detect_only(c: &mut Criterion) {
    let old = generate_snapshot("old", 1000, 7);
    let new = generate_snapshot("new", 1000, 5);
    let engine = DiffEngine::new();

    c.bench_function("detect_1000_modules", |b| {
        b.iter(|| black_box(engine.detect(black_box(&old), black_box(&new))));
    });
}

criterion_group!(benches, benchmark_diff, benchmark_detect_only);
criterion_main!(benches);
