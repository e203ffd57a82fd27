//! Benchmark for ObservableGroupedList.
//!
//! Measures add with group creation, remove with group disposal and
//! `replace_with` reconciliation at several group fan-outs.

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use observable_collections::collections::ObservableGroupedList;
use std::hint::black_box;

const SIZES: [u32; 3] = [100, 1000, 10000];
const FAN_OUTS: [u32; 3] = [1, 16, 256];

fn grouped(size: u32, fan_out: u32) -> ObservableGroupedList<u32, u32, u32> {
    let mut list = ObservableGroupedList::new(move |value: &u32| value % fan_out);
    for key in 0..size {
        let _ = list.add(key, key);
    }
    list
}

// =============================================================================
// add Benchmark
// =============================================================================

fn benchmark_add(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("grouped_list_add");

    for fan_out in FAN_OUTS {
        for size in SIZES {
            group.bench_with_input(
                BenchmarkId::new(format!("fan_out_{fan_out}"), size),
                &size,
                |bencher, &size| {
                    bencher.iter(|| black_box(grouped(black_box(size), fan_out)));
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// remove Benchmark
// =============================================================================

fn benchmark_remove(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("grouped_list_remove");

    for fan_out in FAN_OUTS {
        for size in SIZES {
            group.bench_with_input(
                BenchmarkId::new(format!("fan_out_{fan_out}"), size),
                &size,
                |bencher, &size| {
                    bencher.iter_batched(
                        || grouped(size, fan_out),
                        |mut list| {
                            for key in 0..size {
                                black_box(list.remove(black_box(&key)));
                            }
                            list
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
}

// =============================================================================
// replace_with Benchmark
// =============================================================================

fn benchmark_replace_with(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("grouped_list_replace_with");

    for size in SIZES {
        // Half the items survive, half are swapped for new ones.
        let target: Vec<u32> = (size / 2..size + size / 2).collect();
        group.bench_with_input(BenchmarkId::new("half_overlap", size), &size, |bencher, &size| {
            bencher.iter_batched(
                || (grouped(size, 16), target.clone()),
                |(mut list, target)| {
                    let _ = list.replace_with(target, |value| *value);
                    list
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_add, benchmark_remove, benchmark_replace_with);

criterion_main!(benches);
