// Append and validation benchmarks for the ledger.
//
// Covers digest computation for raw and structured payloads, appends onto a
// growing chain, and full-chain validation at several lengths.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use hashledger::{compute_digest, Chain, DigestAlgorithm, Payload};

fn bench_digest(c: &mut Criterion) {
    let raw = Payload::from("Genesis Block");
    let structured = Payload::from(json!({ "amount": 42, "memo": "rent", "tags": ["a", "b"] }));
    let previous = "0".repeat(64);

    for algorithm in [DigestAlgorithm::Sha256, DigestAlgorithm::Blake3] {
        c.bench_function(&format!("digest/{algorithm}/raw"), |b| {
            b.iter(|| compute_digest(algorithm, 7, &previous, &raw));
        });
        c.bench_function(&format!("digest/{algorithm}/structured"), |b| {
            b.iter(|| compute_digest(algorithm, 7, &previous, &structured));
        });
    }
}

fn bench_append(c: &mut Criterion) {
    c.bench_function("chain/append", |b| {
        let mut chain = Chain::new();
        let mut i = 0u64;
        b.iter(|| {
            i += 1;
            chain.append(json!({ "amount": i % 100 })).expect("append");
        });
    });
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain/validate");

    for size in [10u64, 100, 1_000] {
        let mut chain = Chain::new();
        for i in 0..size {
            chain.append(json!({ "amount": i % 100 })).expect("append");
        }

        group.throughput(Throughput::Elements(size + 1));
        group.bench_with_input(BenchmarkId::from_parameter(size), &chain, |b, chain| {
            b.iter(|| chain.validate());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_digest, bench_append, bench_validate);
criterion_main!(benches);
