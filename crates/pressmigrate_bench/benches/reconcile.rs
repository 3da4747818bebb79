//! Reconciliation and driver benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion, Throughput};
use pressmigrate_bench::{export_server, generate_records, reconciler, InProcessSource, BENCH_TOKEN};
use pressmigrate_engine::{
    BatchDriver, HttpTransport, ImportConfig, LoopbackClient, MemoryWatermarks, RecordApplier,
    RunOptions,
};
use std::sync::Arc;

/// Benchmark reconciling a page into an empty store.
fn bench_reconcile_insert(c: &mut Criterion) {
    let records = generate_records(50);
    let mut group = c.benchmark_group("reconcile");
    group.throughput(Throughput::Elements(records.len() as u64));

    group.bench_function("insert_50", |b| {
        b.iter_batched(
            reconciler,
            |reconciler| {
                for record in &records {
                    black_box(reconciler.apply(record).unwrap());
                }
            },
            BatchSize::SmallInput,
        );
    });

    // Replays hit the update path for every record.
    group.bench_function("update_50", |b| {
        let reconciler = reconciler();
        for record in &records {
            reconciler.apply(record).unwrap();
        }
        b.iter(|| {
            for record in &records {
                black_box(reconciler.apply(record).unwrap());
            }
        });
    });

    group.finish();
}

/// Benchmark a full run over an in-process source.
fn bench_full_run(c: &mut Criterion) {
    let server = Arc::new(export_server(generate_records(500)));
    let mut group = c.benchmark_group("run");
    group.throughput(Throughput::Elements(500));
    group.sample_size(10);

    for page_size in [5u32, 50] {
        group.bench_function(format!("500_records_page_{page_size}"), |b| {
            b.iter_batched(
                || {
                    let config = ImportConfig::new("http://source.bench/posts", BENCH_TOKEN)
                        .with_page_size(page_size);
                    let client = LoopbackClient::new(InProcessSource(Arc::clone(&server)));
                    let transport = HttpTransport::new(&config, client).unwrap();
                    BatchDriver::new(config, transport, reconciler(), MemoryWatermarks::new())
                },
                |driver| {
                    let report = driver.run(&RunOptions::new("post", "publish")).unwrap();
                    black_box(report);
                },
                BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile_insert, bench_full_run);
criterion_main!(benches);
