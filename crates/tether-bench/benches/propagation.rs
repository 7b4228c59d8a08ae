//! Criterion benchmarks for propagation passes and polling.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tether_bench::{fanout_profile, mixed_fanout_profile, polling_profile};
use tether_core::{Value, ValueType};
use tether_engine::{Bindable, BindableConfig, ConnectionType, TickerConfig};
use tether_test_utils::MockAccessor;

fn bench_fanout_identity_64(c: &mut Criterion) {
    let p = fanout_profile(64);
    let mut i = 0i64;
    c.bench_function("fanout_identity_64", |b| {
        b.iter(|| {
            i += 1;
            black_box(p.source.report_change(Value::Int(i)));
        });
    });
}

fn bench_fanout_mixed_64(c: &mut Criterion) {
    let p = mixed_fanout_profile(64);
    let mut i = 0i64;
    c.bench_function("fanout_mixed_64", |b| {
        b.iter(|| {
            i += 1;
            black_box(p.source.report_change(Value::Int(i)));
        });
    });
}

fn bench_echo_suppression(c: &mut Criterion) {
    let p = fanout_profile(0);
    // Eight bidirectional members that echo every write back.
    let echoes: Vec<Bindable> = (0..8)
        .map(|_| {
            let mock = MockAccessor::empty(ValueType::Int);
            let b = Bindable::new(BindableConfig::new(ConnectionType::Bidirectional), mock.clone())
                .unwrap();
            mock.echo_to(&b);
            b.attach(&p.bind);
            b
        })
        .collect();
    let mut i = 0i64;
    c.bench_function("echo_suppression_8", |b| {
        b.iter(|| {
            i += 1;
            black_box(echoes[0].report_change(Value::Int(i)));
        });
    });
}

fn bench_polling_1000_frames(c: &mut Criterion) {
    c.bench_function("polling_64_endpoints_1000_frames", |b| {
        b.iter(|| {
            let mut p = polling_profile(64, TickerConfig::frame_based(4));
            for frame in 0..1000 {
                p.slot.set(frame / 10);
                black_box(p.scheduler.step(1.0 / 60.0).unwrap());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_fanout_identity_64,
    bench_fanout_mixed_64,
    bench_echo_suppression,
    bench_polling_1000_frames
);
criterion_main!(benches);
