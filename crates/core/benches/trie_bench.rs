//! Benchmarks for sprig-core path tries.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sprig_core::{Path, PathTrie};

fn make_paths(count: usize, depth: usize) -> Vec<Path> {
    (0..count)
        .map(|i| Path::new((0..depth).map(|d| format!("f{}", (i + d) % 16))))
        .collect()
}

fn build_trie(paths: &[Path]) -> PathTrie<Vec<usize>> {
    let mut trie = PathTrie::new();
    for (i, path) in paths.iter().enumerate() {
        trie.touch(path).push(i);
    }
    trie
}

fn bench_touch(c: &mut Criterion) {
    let mut group = c.benchmark_group("touch");

    for size in [10, 100, 1000] {
        let paths = make_paths(size, 4);
        group.bench_with_input(BenchmarkId::new("depth_4", size), &paths, |b, paths| {
            b.iter(|| build_trie(black_box(paths)))
        });
    }

    group.finish();
}

fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");

    for size in [10, 100, 1000] {
        let old = build_trie(&make_paths(size, 3));
        let new = build_trie(&make_paths(size / 2 + 1, 3));
        group.bench_with_input(BenchmarkId::new("half_overlap", size), &(old, new), |b, (old, new)| {
            b.iter(|| black_box(new).diff(black_box(old)))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for size in [10, 100, 1000] {
        let subscriptions = build_trie(&make_paths(size, 4));
        let mut dirty: PathTrie<()> = PathTrie::new();
        dirty.touch(&Path::from(["f1", "f2"]));
        dirty.touch(&Path::from(["f7", "f8", "f9", "f10"]));

        group.bench_with_input(
            BenchmarkId::new("two_writes", size),
            &subscriptions,
            |b, subscriptions| b.iter(|| black_box(&dirty).search(black_box(subscriptions)).len()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_touch, bench_diff, bench_search);
criterion_main!(benches);
