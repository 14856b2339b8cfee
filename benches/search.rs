//! Kernel and end-to-end search benchmarks
//!
//! Run with: cargo bench --bench search

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use resona::simd::{cosine_from_norms, dot_product, vector_norm};
use resona::{VectorConfig, VectorStore};

fn random_vector(rng: &mut StdRng, dim: usize) -> Vec<f32> {
    (0..dim).map(|_| rng.gen::<f32>() - 0.5).collect()
}

fn bench_kernel(c: &mut Criterion) {
    let dims = [64, 128, 384, 1536];
    let mut rng = StdRng::seed_from_u64(42);

    let mut group = c.benchmark_group("kernel");
    for dim in dims {
        group.throughput(Throughput::Elements(dim as u64));

        let a = random_vector(&mut rng, dim);
        let b = random_vector(&mut rng, dim);
        let norm_a = vector_norm(&a);
        let norm_b = vector_norm(&b);

        group.bench_function(format!("dot_dim_{dim}"), |bencher| {
            bencher.iter(|| dot_product(black_box(&a), black_box(&b)).unwrap())
        });
        group.bench_function(format!("cosine_precomputed_dim_{dim}"), |bencher| {
            bencher.iter(|| {
                cosine_from_norms(black_box(&a), norm_a, black_box(&b), norm_b).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_search_10k(c: &mut Criterion) {
    let dim = 384;
    let n = 10_000;
    let mut rng = StdRng::seed_from_u64(7);

    let store = VectorStore::new(VectorConfig::new(dim)).unwrap();
    let vectors: Vec<Vec<f32>> = (0..n).map(|_| random_vector(&mut rng, dim)).collect();
    let metadata = vec![None; n];
    store.insert_batch(&vectors, &metadata).unwrap();
    store.create_indexes().unwrap();

    let query = random_vector(&mut rng, dim);

    let mut group = c.benchmark_group("search_10k");
    group.sample_size(20);
    group.throughput(Throughput::Elements(n as u64));
    for k in [1, 5, 50] {
        group.bench_function(format!("k_{k}"), |bencher| {
            bencher.iter(|| store.search(black_box(&query), k).unwrap())
        });
    }
    group.finish();
}

fn bench_insert_batch(c: &mut Criterion) {
    let dim = 384;
    let mut rng = StdRng::seed_from_u64(99);
    let vectors: Vec<Vec<f32>> = (0..1000).map(|_| random_vector(&mut rng, dim)).collect();
    let metadata = vec![None; 1000];

    c.bench_function("insert_batch_1k", |bencher| {
        bencher.iter(|| {
            let store = VectorStore::new(VectorConfig::new(dim)).unwrap();
            store
                .insert_batch(black_box(&vectors), black_box(&metadata))
                .unwrap()
        })
    });
}

criterion_group!(benches, bench_kernel, bench_search_10k, bench_insert_batch);
criterion_main!(benches);
