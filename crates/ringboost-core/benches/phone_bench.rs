//! Criterion benchmarks for caller-id normalization and event decoding.
//!
//! Both run once per incoming call on the ringing path, before the ringer is
//! touched, so they should stay in the sub-microsecond range.
//!
//! Run with:
//! ```bash
//! cargo bench --package ringboost-core --bench phone_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ringboost_core::{caller_suffix, decode_event};

/// Caller ids in the formats typically delivered by carriers and contact apps.
const BENCH_NUMBERS: &[&str] = &[
    "5551234567",
    "+15551234567",
    "+1 (555) 123-4567",
    "555.123.4567",
    "+44 20 7946 0958",
    "911",
    "Unknown",
];

fn bench_caller_suffix(c: &mut Criterion) {
    let mut group = c.benchmark_group("caller_suffix");
    for number in BENCH_NUMBERS {
        group.bench_with_input(BenchmarkId::from_parameter(number), number, |b, n| {
            b.iter(|| caller_suffix(black_box(n)))
        });
    }
    group.finish();
}

fn bench_decode_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_event");
    group.bench_function("plain_ringing", |b| {
        b.iter(|| decode_event(black_box("RINGING +1 (555) 123-4567")))
    });
    group.bench_function("json_ringing", |b| {
        b.iter(|| {
            decode_event(black_box(
                r#"{"state": "RINGING", "incoming_number": "+15551234567"}"#,
            ))
        })
    });
    group.bench_function("idle", |b| b.iter(|| decode_event(black_box("IDLE"))));
    group.finish();
}

criterion_group!(benches, bench_caller_suffix, bench_decode_event);
criterion_main!(benches);
