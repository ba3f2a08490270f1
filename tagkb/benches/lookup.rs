//! Lookup cost should stay flat as the number of stored prefixes grows.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use prefix_tags::{Prefix, PrefixTagIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_entries(n: usize, seed: u64) -> Vec<(Prefix<u32>, String)> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|i| {
            let len = rng.gen_range(8..=32);
            let prefix = Prefix::new(rng.gen::<u32>(), len).unwrap();
            (prefix, format!("tag{}", i % 1_000))
        })
        .collect()
}

fn generate_probes(n: usize) -> Vec<u32> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..n).map(|_| rng.gen()).collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    group.sample_size(10);

    for size in [1_000, 100_000] {
        let entries = generate_entries(size, 1);
        group.bench_with_input(BenchmarkId::new("PrefixTagIndex", size), &entries, |b, entries| {
            b.iter(|| {
                let index =
                    PrefixTagIndex::build(entries.iter().map(|(p, t)| (*p, t.as_str()))).unwrap();
                black_box(index)
            });
        });
    }

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");
    let probes = generate_probes(1_000);

    for size in [100, 10_000, 1_000_000] {
        let entries = generate_entries(size, 1);
        let index = PrefixTagIndex::build(entries.iter().map(|(p, t)| (*p, t.as_str()))).unwrap();

        // Probe stored addresses too, so deep paths get exercised.
        let mut hits: Vec<u32> = entries.iter().take(1_000).map(|(p, _)| p.addr()).collect();
        hits.extend(probes.iter().copied());

        group.bench_with_input(BenchmarkId::new("PrefixTagIndex", size), &hits, |b, hits| {
            b.iter(|| {
                let mut found = 0usize;
                for &addr in hits {
                    found += index.lookup(black_box(addr)).len();
                }
                black_box(found)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_lookup);
criterion_main!(benches);
