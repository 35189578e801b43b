//! Benchmark for the RedBlackTree engine.
//!
//! Covers the operations only the tree offers: duplicate-key insertion,
//! cursor walks, bound queries and position-based erase.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rbmap::tree::RedBlackTree;

fn build(size: i32) -> RedBlackTree<i32, i32> {
    (0..size).map(|index| (index, index)).collect()
}

// =============================================================================
// insert_duplicates Benchmark
// =============================================================================

fn benchmark_insert_duplicates(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert_duplicates");

    for size in [100, 1000, 10000] {
        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut tree = RedBlackTree::new();
                for index in 0..size {
                    tree.insert(black_box(index % 16), index);
                }
                black_box(tree)
            });
        });
    }

    group.finish();
}

// =============================================================================
// cursor_walk Benchmark
// =============================================================================

fn benchmark_cursor_walk(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("cursor_walk");

    for size in [100, 1000, 10000] {
        let tree = build(size);

        group.bench_with_input(BenchmarkId::new("forward", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut cursor = tree.begin();
                let mut sum = 0;
                while let Ok(value) = cursor.value() {
                    sum += value;
                    cursor.move_next();
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("backward", size), &size, |bencher, _| {
            bencher.iter(|| {
                let mut cursor = tree.end();
                cursor.move_prev();
                let mut sum = 0;
                while let Ok(value) = cursor.value() {
                    sum += value;
                    cursor.move_prev();
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// lower_bound Benchmark
// =============================================================================

fn benchmark_lower_bound(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("lower_bound");

    for size in [100, 1000, 10000] {
        let tree: RedBlackTree<i32, i32> = (0..size).map(|index| (index * 2, index)).collect();

        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut hits = 0;
                for key in 0..size * 2 {
                    if !tree.lower_bound(&black_box(key)).is_end() {
                        hits += 1;
                    }
                }
                black_box(hits)
            });
        });
    }

    group.finish();
}

// =============================================================================
// erase_by_position Benchmark
// =============================================================================

fn benchmark_erase_by_position(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("erase_by_position");

    for size in [100, 1000, 10000] {
        let tree = build(size);

        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &size, |bencher, _| {
            bencher.iter_batched(
                || tree.clone(),
                |mut tree| {
                    while !tree.is_empty() {
                        let position = tree.begin().position();
                        let _ = tree.erase(black_box(position));
                    }
                    black_box(tree)
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

// =============================================================================
// clone Benchmark
// =============================================================================

fn benchmark_clone(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("clone");

    for size in [100, 1000, 10000] {
        let tree = build(size);

        group.bench_with_input(BenchmarkId::new("RedBlackTree", size), &size, |bencher, _| {
            bencher.iter(|| black_box(tree.clone()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_insert_duplicates,
    benchmark_cursor_walk,
    benchmark_lower_bound,
    benchmark_erase_by_position,
    benchmark_clone
);
criterion_main!(benches);
