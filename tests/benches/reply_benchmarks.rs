//! # Reply Service Benchmarks
//!
//! Hot paths of one dispatch cycle, measured without I/O:
//!
//! | Path | Work per call |
//! |------|---------------|
//! | classification | prefix check plus code table |
//! | template selection | bank pick, placeholder fill, window scan |
//! | similarity | two word sets |
//! | full cycle | fetch, generate, post, ledger write for a batch |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mb_02_reply_content::{jaccard, OutcomeClassifier, RecentReplyWindow};
use mb_tests::fixtures::{at, seeded_templates, settled, unpaced, Scenario};
use shared_types::{PaymentKind, TransactionRecord};

const CODES: [&str; 10] = [
    "0x9f2c4e6a8b0d1f3e5a7c9b1d3f5e7a9c",
    "LIMIT_REACHED",
    "ERROR_ALLOWANCE",
    "ERROR_BALANCE",
    "ERROR_TREASURY_EMPTY",
    "ERROR_BLOCKCHAIN: execution reverted",
    "SKIP_DUPLICATE_GRANT",
    "SKIP_NO_WALLET",
    "MAX_RETRIES_EXCEEDED: timeout",
    "something unexpected",
];

fn bench_classification(c: &mut Criterion) {
    let classifier = OutcomeClassifier::default();
    let records: Vec<TransactionRecord> = CODES
        .iter()
        .enumerate()
        .map(|(i, code)| TransactionRecord::new(format!("c{i}"), "BSC", at(0)).with_outcome(*code))
        .collect();

    let mut group = c.benchmark_group("mb-02-classification");
    group.throughput(Throughput::Elements(records.len() as u64));
    group.bench_function("classify_code_table", |b| {
        b.iter(|| {
            for record in &records {
                black_box(classifier.classify(record));
            }
        })
    });
    group.finish();
}

fn bench_template_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("mb-02-templates");

    for kind in [PaymentKind::P2pCommand, PaymentKind::Grant] {
        let label = kind.as_str().to_string();
        let record = settled("t1", 0).with_kind(kind).with_recipient("alice");
        let mut generator = seeded_templates(5);
        group.bench_with_input(
            BenchmarkId::new("select", label),
            &record,
            |b, record| b.iter(|| black_box(generator.select(record))),
        );
    }

    group.finish();
}

fn bench_similarity(c: &mut Criterion) {
    let a = "Payment of 10 USDT to @alice confirmed on BSC, enjoy it";
    let b = "Sent 10 USDT over to @alice on BSC, all settled now";

    let mut group = c.benchmark_group("mb-02-similarity");
    group.bench_function("jaccard_pair", |bench| {
        bench.iter(|| black_box(jaccard(black_box(a), black_box(b))))
    });

    let mut window = RecentReplyWindow::with_capacity(20);
    for i in 0..20 {
        window.push(format!("Reply number {i} for @user{i} on BSC"));
    }
    group.bench_function("window_is_distinct_full", |bench| {
        bench.iter(|| black_box(window.is_distinct(black_box(a))))
    });
    group.finish();
}

fn bench_dispatch_cycle(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| panic!("runtime: {e}"));

    let mut group = c.benchmark_group("mb-03-dispatch");
    for batch in [1usize, 5, 20] {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::new("run_cycle", batch), &batch, |b, &batch| {
            b.iter_batched(
                || {
                    let records = (0..batch as i64)
                        .map(|i| settled(&format!("r{i}"), i))
                        .collect();
                    Scenario::builder(records)
                        .dispatch(mb_03_reply_dispatch::DispatchConfig {
                            batch_size: batch,
                            ..unpaced()
                        })
                        .build()
                },
                |mut scenario| black_box(runtime.block_on(scenario.dispatch.run_cycle())),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_classification,
    bench_template_selection,
    bench_similarity,
    bench_dispatch_cycle,
);

criterion_main!(benches);
