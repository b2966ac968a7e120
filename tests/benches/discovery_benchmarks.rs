//! # Bucket-Ping Discovery Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | Codecs | encode/decode a group's worth of records |
//! | Registry | full read round over N objects, paged |

use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bucket_discovery::test_utils::{peer, registry_on};
use bucket_discovery::{
    CodecKind, DiscoveryBackend, InMemoryObjectStore, NodeAddress, PeerRecord, RegistryConfig,
    Responses,
};

fn records(n: usize) -> Vec<PeerRecord> {
    (0..n)
        .map(|i| peer(NodeAddress::random(), &format!("node-{}", i), (i % 250) as u8))
        .collect()
}

// ============================================================================
// CODECS
// ============================================================================

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codecs");
    group.measurement_time(Duration::from_secs(5));

    for kind in [CodecKind::Text, CodecKind::Json] {
        let codec = kind.build();
        for size in [1, 100, 1000] {
            let batch = records(size);
            let payload = codec.encode(&batch).unwrap();

            group.throughput(Throughput::Elements(size as u64));
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}_encode", kind), size),
                &batch,
                |b, batch| b.iter(|| black_box(codec.encode(batch).unwrap())),
            );
            group.bench_with_input(
                BenchmarkId::new(format!("{:?}_decode", kind), size),
                &payload,
                |b, payload| b.iter(|| black_box(codec.decode(payload).unwrap())),
            );
        }
    }

    group.finish();
}

// ============================================================================
// READ ROUNDS
// ============================================================================

fn bench_read_round(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("read_round");

    for members in [10usize, 100, 1000] {
        let store = Arc::new(InMemoryObjectStore::with_page_size(100));
        runtime.block_on(async {
            for record in records(members) {
                let writer = registry_on(store.clone(), RegistryConfig::default(), record.address);
                writer.write(&[record], "bench").await;
            }
        });
        let reader = registry_on(store.clone(), RegistryConfig::default(), NodeAddress::random());

        group.throughput(Throughput::Elements(members as u64));
        group.bench_function(BenchmarkId::new("read_all", members), |b| {
            b.iter(|| {
                runtime.block_on(async {
                    let mut responses = Responses::new();
                    reader.read_all(None, "bench", &mut responses).await;
                    black_box(responses.len())
                })
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_codecs, bench_read_round);
criterion_main!(benches);
