use criterion::{criterion_group, criterion_main, Criterion};
use latte_algebra::prelude::*;

fn bench_ntt(c: &mut Criterion) {
    let mut prng = test_rng();
    let q = BigUint::from(65432u64).pow(16) + 1u32;
    let ring = Ring::new(1024, &q, RingKind::Cyclotomic).unwrap();
    let coeffs = prng.sample_uniform_vec(&q, 1024);
    let a = ring.new_poly(coeffs, false).unwrap();
    let a_ntt = ring.to_ntt(&a).unwrap();

    let mut group = c.benchmark_group("ring");
    group.sample_size(10);
    group.bench_function("ntt 1024", |b| b.iter(|| ring.to_ntt(&a).unwrap()));
    group.bench_function("intt 1024", |b| b.iter(|| ring.to_coeff(&a_ntt).unwrap()));
    group.bench_function("pointwise mul 1024", |b| {
        b.iter(|| ring.mul(&a_ntt, &a_ntt).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_ntt);
criterion_main!(benches);
