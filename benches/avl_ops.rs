//! Benchmarks for AVL tree operations.

use avl_rs::AvlTree;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;

fn generate_sequential_keys(n: usize) -> Vec<u64> {
    (0..n as u64).collect()
}

fn generate_shuffled_keys(n: usize) -> Vec<u64> {
    let mut keys = generate_sequential_keys(n);
    keys.shuffle(&mut StdRng::seed_from_u64(7));
    keys
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for size in [1_000, 10_000, 100_000] {
        for (pattern, keys) in [
            ("sequential", generate_sequential_keys(size)),
            ("shuffled", generate_shuffled_keys(size)),
        ] {
            group.bench_with_input(
                BenchmarkId::new(format!("AvlTree/{pattern}"), size),
                &keys,
                |b, keys| {
                    b.iter(|| {
                        let mut tree = AvlTree::new();
                        for &key in keys {
                            tree.insert(key, key);
                        }
                        black_box(tree)
                    });
                },
            );

            group.bench_with_input(
                BenchmarkId::new(format!("BTreeMap/{pattern}"), size),
                &keys,
                |b, keys| {
                    b.iter(|| {
                        let mut map = BTreeMap::new();
                        for &key in keys {
                            map.insert(key, key);
                        }
                        black_box(map)
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for size in [1_000, 10_000, 100_000] {
        let keys = generate_shuffled_keys(size);
        let tree: AvlTree<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
        let btree: BTreeMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

        group.bench_with_input(BenchmarkId::new("AvlTree", size), &keys, |b, keys| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in keys {
                    if let Some(v) = tree.get(key) {
                        sum = sum.wrapping_add(*v);
                    }
                }
                black_box(sum)
            });
        });

        group.bench_with_input(BenchmarkId::new("BTreeMap", size), &keys, |b, keys| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in keys {
                    if let Some(v) = btree.get(key) {
                        sum = sum.wrapping_add(*v);
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    let size = 10_000;
    let keys = generate_shuffled_keys(size);
    let tree: AvlTree<u64, u64> = keys.iter().map(|&k| (k, k)).collect();
    let btree: BTreeMap<u64, u64> = keys.iter().map(|&k| (k, k)).collect();

    group.bench_function("AvlTree", |b| {
        b.iter(|| {
            let mut t = tree.clone();
            for key in &keys {
                t.remove(key);
            }
            black_box(t)
        });
    });

    group.bench_function("BTreeMap", |b| {
        b.iter(|| {
            let mut m = btree.clone();
            for key in &keys {
                m.remove(key);
            }
            black_box(m)
        });
    });

    group.finish();
}

criterion_group!(benches, bench_insert, bench_lookup, bench_remove);
criterion_main!(benches);
