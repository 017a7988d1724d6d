use avl_hashmap::AvlHashMap;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use std::hash::{BuildHasher, Hasher};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// Worst case for bucket routing: every key hashes to bucket 0.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("avl_hashmap_insert_10k", |b| {
        b.iter_batched(
            AvlHashMap::<String, u64>::new,
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_degenerate_hash(c: &mut Criterion) {
    c.bench_function("avl_hashmap_insert_10k_constant_hash", |b| {
        b.iter_batched(
            || AvlHashMap::<String, u64, ConstBuildHasher>::with_hasher(ConstBuildHasher),
            |mut m| {
                for (i, x) in lcg(1).take(10_000).enumerate() {
                    m.insert(key(x), i as u64);
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("avl_hashmap_get_hit", |b| {
        let mut m = AvlHashMap::new();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.insert(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_hit_degenerate_hash(c: &mut Criterion) {
    c.bench_function("avl_hashmap_get_hit_constant_hash", |b| {
        let mut m = AvlHashMap::with_hasher(ConstBuildHasher);
        let keys: Vec<_> = lcg(13).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.insert(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("avl_hashmap_get_miss", |b| {
        let mut m = AvlHashMap::new();
        for (i, x) in lcg(11).take(10_000).enumerate() {
            m.insert(key(x), i as u64);
        }
        let mut miss = lcg(0xdead_beef);
        b.iter(|| {
            // generate keys unlikely in map
            let k = key(miss.next().unwrap());
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_remove_insert_churn(c: &mut Criterion) {
    c.bench_function("avl_hashmap_churn", |b| {
        let mut m = AvlHashMap::new();
        let keys: Vec<_> = lcg(17).take(10_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.insert(k, i as u64);
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            let v = m.remove(k.as_str()).unwrap();
            m.insert(k.clone(), v);
        })
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert, bench_insert_degenerate_hash, bench_get_hit,
        bench_get_hit_degenerate_hash, bench_get_miss, bench_remove_insert_churn
}
criterion_main!(benches);
